//! Collaborator boundaries: article index, file storage, repository store
//!
//! Implementations live outside this crate (the CLI ships local ones). All of
//! them report failures as [`FetchError`] so the worker can retry them.

use chrono::NaiveDate;
use pubmetrics_core::FetchError;

use crate::article::ArticleRecord;

/// Default marker separating a storage prefix from the stored file key.
pub const DEFAULT_STORAGE_MARKER: &str = "ch/media/";

/// Inclusive publication date bounds; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, chrono::ParseError> {
        let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d");
        Ok(Self {
            start: start.map(parse).transpose()?,
            end: end.map(parse).transpose()?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Streaming article cursor.
pub type ArticleCursor<'a> = Box<dyn Iterator<Item = Result<ArticleRecord, FetchError>> + Send + 'a>;

/// The article index.
pub trait ArticleSource: Sync {
    /// Articles whose publication date lies in `range`, lazily.
    fn articles(&self, range: &DateRange) -> Result<ArticleCursor<'_>, FetchError>;
}

/// Stored article files.
pub trait FileStore: Sync {
    /// Bytes of the first stored record whose key contains `suffix` (see
    /// [`storage_suffix`]), `None` when no record matches.
    fn fetch(&self, suffix: &str) -> Result<Option<Vec<u8>>, FetchError>;
}

/// Author and affiliation rows held outside the XML.
pub trait RepositoryAffiliations: Sync {
    fn author_ids(&self, article_id: &str) -> Result<Vec<String>, FetchError>;

    fn affiliation_count(&self, author_id: &str) -> Result<usize, FetchError>;

    /// Sum of the per-author counts of `article_id`.
    fn article_affiliation_count(&self, article_id: &str) -> Result<usize, FetchError> {
        let mut total = 0;
        for author in self.author_ids(article_id)? {
            total += self.affiliation_count(&author)?;
        }
        Ok(total)
    }
}

/// Part of `path` after the last occurrence of `marker`, or the whole path
/// when the marker is absent.
pub fn storage_suffix<'a>(path: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return path;
    }
    match path.rfind(marker) {
        Some(pos) => &path[pos + marker.len()..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn date_range_is_inclusive() {
        let range = DateRange::parse(Some("2024-10-01"), Some("2024-12-31")).unwrap();
        assert!(range.contains(date("2024-10-01")));
        assert!(range.contains(date("2024-12-31")));
        assert!(!range.contains(date("2024-09-30")));
        assert!(!range.contains(date("2025-01-01")));
    }

    #[test]
    fn open_ended_ranges() {
        let from = DateRange::parse(Some("2024-01-01"), None).unwrap();
        assert!(from.contains(date("2099-01-01")));
        assert!(!from.contains(date("2023-12-31")));

        assert!(DateRange::default().contains(date("1900-01-01")));
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(DateRange::parse(Some("2024-13-01"), None).is_err());
        assert!(DateRange::parse(None, Some("01/02/2024")).is_err());
    }

    #[test]
    fn suffix_after_last_marker() {
        assert_eq!(
            storage_suffix("https://x/ch/media/files/1/a.xml", DEFAULT_STORAGE_MARKER),
            "files/1/a.xml"
        );
        assert_eq!(
            storage_suffix("ch/media/old/ch/media/files/a.xml", DEFAULT_STORAGE_MARKER),
            "files/a.xml"
        );
        assert_eq!(storage_suffix("files/a.xml", DEFAULT_STORAGE_MARKER), "files/a.xml");
        assert_eq!(storage_suffix("files/a.xml", ""), "files/a.xml");
    }

    struct Fixed;

    impl RepositoryAffiliations for Fixed {
        fn author_ids(&self, article_id: &str) -> Result<Vec<String>, FetchError> {
            Ok(match article_id {
                "1" => vec!["a".into(), "b".into()],
                _ => Vec::new(),
            })
        }

        fn affiliation_count(&self, author_id: &str) -> Result<usize, FetchError> {
            Ok(if author_id == "a" { 2 } else { 3 })
        }
    }

    #[test]
    fn article_count_sums_authors() {
        assert_eq!(Fixed.article_affiliation_count("1").unwrap(), 5);
        assert_eq!(Fixed.article_affiliation_count("2").unwrap(), 0);
    }
}
