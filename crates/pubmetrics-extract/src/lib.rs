//! Pubmetrics Extract - per-article metrics from publisher XML
//!
//! Recovers authors, affiliation references and data-availability statements
//! from several publisher XML dialects and aggregates them into one report row
//! per article.
//!
//! # Features
//!
//! - Streaming XML parsing with quick-xml (JATS, Springer A++)
//! - One strategy table per publisher, consumed by dispatch, header and aggregation
//! - Parallel, order-preserving processing with rayon
//!
//! # Example
//!
//! ```ignore
//! use pubmetrics_extract::{Collaborators, ExportConfig, Publisher, run};
//!
//! let config = ExportConfig::new(Publisher::Elsevier);
//! let collaborators = Collaborators { files: &store, repository: &repo };
//! let export = run(&config, &index, collaborators, shutdown_flag(), &progress)?;
//! export.table.write_csv_file("elsevier.csv".as_ref())?;
//! ```

pub mod affiliation;
pub mod article;
pub mod config;
pub mod datasets;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod model;
pub mod parser;
pub mod publisher;
pub mod report;
pub mod runner;
pub mod schema;
pub mod source;
pub mod worker;
mod xml;

// Re-exports
pub use article::ArticleRecord;
pub use config::ExportConfig;
pub use datasets::{DatasetExtractor, ElsevierDatasets, HindawiDatasets};
pub use dispatch::dispatch;
pub use error::{ArticleError, MalformedDocument};
pub use metrics::{MetricValue, MetricsRecord, aggregate};
pub use model::{
    AffiliationRecord, AffiliationReference, AuthorRecord, DatasetStatement, Extraction,
    ParsedAuthors,
};
pub use parser::AuthorParser;
pub use publisher::{AffiliationSource, Publisher, PublisherSchema};
pub use report::ReportTable;
pub use runner::{Export, Summary, run};
pub use schema::{Column, header_for, ordered_header};
pub use source::{
    ArticleCursor, ArticleSource, DEFAULT_STORAGE_MARKER, DateRange, FileStore,
    RepositoryAffiliations, storage_suffix,
};
pub use worker::Collaborators;
