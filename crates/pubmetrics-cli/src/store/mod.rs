//! Local collaborator implementations for the export
//!
//! The article index is a JSON Lines dump, article files live in a directory
//! or behind an HTTP base URL, and the repository rows are one JSON document.

pub mod files;
pub mod jsonl;
pub mod repository;

pub use files::{DirFileStore, HttpFileStore, open_file_store};
pub use jsonl::JsonlArticleSource;
pub use repository::JsonRepository;
