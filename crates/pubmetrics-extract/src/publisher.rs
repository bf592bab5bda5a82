//! Publisher strategy table
//!
//! Every per-publisher decision (which author parser, which dataset
//! extractor, where affiliation counts come from, which extra columns) lives
//! in one [`PublisherSchema`] entry. The dispatcher, the header builder and
//! the aggregator all read from it.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::datasets::{DatasetExtractor, ElsevierDatasets, HindawiDatasets};
use crate::parser::{AuthorParser, JatsAuthors, OupAuthors, SpringerAuthors};
use crate::schema::Column;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Publisher {
    Aps,
    Hindawi,
    Springer,
    Oup,
    Elsevier,
    /// Any other tag, kept verbatim for logging
    Unsupported(String),
}

/// Where the non-unique affiliation count of a publisher comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationSource {
    /// Length of the parsed reference sequence
    Xml,
    /// Sum of the repository store's per-author counts
    Repository,
}

pub struct PublisherSchema {
    pub authors: Option<&'static dyn AuthorParser>,
    pub datasets: Option<&'static dyn DatasetExtractor>,
    pub affiliations: AffiliationSource,
    pub extra_columns: &'static [Column],
}

static APS: PublisherSchema = PublisherSchema {
    authors: Some(&JatsAuthors),
    datasets: None,
    affiliations: AffiliationSource::Xml,
    extra_columns: &[Column::OrcidCount, Column::NonUniqueAffiliations, Column::RorLinked],
};

static SPRINGER: PublisherSchema = PublisherSchema {
    authors: Some(&SpringerAuthors),
    datasets: None,
    affiliations: AffiliationSource::Xml,
    extra_columns: &[Column::OrcidCount, Column::NonUniqueAffiliations, Column::RorLinked],
};

static HINDAWI: PublisherSchema = PublisherSchema {
    authors: Some(&JatsAuthors),
    datasets: Some(&HindawiDatasets),
    affiliations: AffiliationSource::Xml,
    extra_columns: &[Column::OrcidCount, Column::NonUniqueAffiliations, Column::DatasetLinks],
};

static OUP: PublisherSchema = PublisherSchema {
    authors: Some(&OupAuthors),
    datasets: None,
    affiliations: AffiliationSource::Repository,
    extra_columns: &[Column::OrcidCount, Column::NonUniqueAffiliations],
};

static ELSEVIER: PublisherSchema = PublisherSchema {
    authors: None,
    datasets: Some(&ElsevierDatasets),
    affiliations: AffiliationSource::Repository,
    extra_columns: &[Column::NonUniqueAffiliations, Column::DatasetLinks],
};

impl Publisher {
    /// Every supported publisher.
    pub const KNOWN: [Publisher; 5] = [
        Publisher::Aps,
        Publisher::Hindawi,
        Publisher::Springer,
        Publisher::Oup,
        Publisher::Elsevier,
    ];

    /// Exact, case-sensitive match on the index's publisher tag.
    pub fn from_name(name: &str) -> Self {
        match name {
            "APS" => Self::Aps,
            "Hindawi" => Self::Hindawi,
            "Springer" => Self::Springer,
            "OUP" => Self::Oup,
            "Elsevier" => Self::Elsevier,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Tag as it appears in the article index.
    pub fn name(&self) -> &str {
        match self {
            Self::Aps => "APS",
            Self::Hindawi => "Hindawi",
            Self::Springer => "Springer",
            Self::Oup => "OUP",
            Self::Elsevier => "Elsevier",
            Self::Unsupported(name) => name,
        }
    }

    /// Strategy entry, `None` for unsupported publishers.
    pub fn schema(&self) -> Option<&'static PublisherSchema> {
        match self {
            Self::Aps => Some(&APS),
            Self::Hindawi => Some(&HINDAWI),
            Self::Springer => Some(&SPRINGER),
            Self::Oup => Some(&OUP),
            Self::Elsevier => Some(&ELSEVIER),
            Self::Unsupported(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl FromStr for Publisher {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for publisher in Publisher::KNOWN {
            assert_eq!(Publisher::from_name(publisher.name()), publisher);
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(
            Publisher::from_name("aps"),
            Publisher::Unsupported("aps".into())
        );
        assert_eq!(
            "Wiley".parse::<Publisher>().unwrap(),
            Publisher::Unsupported("Wiley".into())
        );
        assert!(!Publisher::from_name("springer").is_supported());
    }

    #[test]
    fn unsupported_has_no_schema() {
        assert!(Publisher::Unsupported("Wiley".into()).schema().is_none());
        assert!(Publisher::KNOWN.iter().all(|p| p.schema().is_some()));
    }

    #[test]
    fn strategy_entries() {
        let oup = Publisher::Oup.schema().unwrap();
        assert_eq!(oup.affiliations, AffiliationSource::Repository);
        assert_eq!(oup.authors.map(|p| p.name()), Some("oup"));
        assert!(oup.datasets.is_none());

        let elsevier = Publisher::Elsevier.schema().unwrap();
        assert!(elsevier.authors.is_none());
        assert_eq!(elsevier.datasets.map(|d| d.name()), Some("elsevier"));
        assert!(!elsevier.extra_columns.contains(&Column::OrcidCount));

        let hindawi = Publisher::Hindawi.schema().unwrap();
        assert_eq!(hindawi.authors.map(|p| p.name()), Some("jats"));
        assert_eq!(hindawi.affiliations, AffiliationSource::Xml);
        assert!(hindawi.extra_columns.contains(&Column::DatasetLinks));
    }

    #[test]
    fn unsupported_displays_its_tag() {
        let wiley = Publisher::from_name("Wiley");
        assert_eq!(format!("{wiley}"), "Wiley");
        assert_eq!(format!("{}", Publisher::Oup), "OUP");
    }

    #[test]
    fn no_publisher_uses_the_repository_column() {
        for publisher in Publisher::KNOWN {
            let schema = publisher.schema().unwrap();
            assert!(!schema.extra_columns.contains(&Column::RepositoryAffiliations));
        }
    }
}
