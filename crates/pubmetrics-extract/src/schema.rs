//! Report columns
//!
//! [`Column`] declaration order is the canonical column order; every header is
//! a subset of it in that order.

use std::fmt;

use crate::publisher::Publisher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Year,
    Journal,
    Doi,
    PublicationDate,
    ArxivNumber,
    PrimaryArxivCategory,
    TotalAuthors,
    OrcidCount,
    NonUniqueAffiliations,
    RepositoryAffiliations,
    RorLinked,
    DatasetLinks,
    DatasetMaterials,
    SoftwareMaterials,
}

/// Columns present for every publisher.
pub const BASE_COLUMNS: [Column; 9] = [
    Column::Year,
    Column::Journal,
    Column::Doi,
    Column::PublicationDate,
    Column::ArxivNumber,
    Column::PrimaryArxivCategory,
    Column::TotalAuthors,
    Column::DatasetMaterials,
    Column::SoftwareMaterials,
];

impl Column {
    /// CSV header label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Journal => "journal",
            Self::Doi => "doi",
            Self::PublicationDate => "publication date",
            Self::ArxivNumber => "arxiv number",
            Self::PrimaryArxivCategory => "primary arxiv category",
            Self::TotalAuthors => "total number of authors",
            Self::OrcidCount => "total number of ORCIDs linked to the authors",
            Self::NonUniqueAffiliations => "total number of non-unique affiliations",
            Self::RepositoryAffiliations => "total number of repository affiliations",
            Self::RorLinked => "total number of RORs linked with the non-unique affiliations",
            Self::DatasetLinks => "link to datasets",
            Self::DatasetMaterials => "total number of related materials, type dataset",
            Self::SoftwareMaterials => "total number of related materials, type software",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Base columns followed by the publisher's extra columns, unordered.
pub fn header_for(publisher: &Publisher) -> Vec<Column> {
    let mut columns = BASE_COLUMNS.to_vec();
    if let Some(schema) = publisher.schema() {
        columns.extend_from_slice(schema.extra_columns);
    }
    columns
}

/// [`header_for`] in canonical order.
pub fn ordered_header(publisher: &Publisher) -> Vec<Column> {
    let mut columns = header_for(publisher);
    columns.sort_unstable();
    columns.dedup();
    columns
}
