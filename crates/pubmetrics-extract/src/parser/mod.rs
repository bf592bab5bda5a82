//! Publisher author parsers
//!
//! Every dialect is reduced to the same [`ParsedAuthors`]: the authors in
//! document order plus one [`AffiliationReference`](crate::model::AffiliationReference)
//! per reference token.

pub mod jats;
pub mod oup;
pub mod springer;

pub use jats::JatsAuthors;
pub use oup::OupAuthors;
pub use springer::SpringerAuthors;

use crate::error::MalformedDocument;
use crate::model::ParsedAuthors;

/// Recovers authors and affiliation references from one decoded document.
pub trait AuthorParser: Sync {
    /// Short dialect name for logs
    fn name(&self) -> &'static str;

    fn parse(&self, xml: &str) -> Result<ParsedAuthors, MalformedDocument>;
}
