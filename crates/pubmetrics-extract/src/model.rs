//! Publisher-independent model recovered from every XML dialect

/// One affiliation as declared in a document. Ids are only unique within
/// that document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffiliationRecord {
    pub id: String,
    pub name: Option<String>,
    pub ror: Option<String>,
}

/// One author→affiliation reference token.
///
/// Never deduplicated: two authors pointing at the same affiliation give two
/// references. Counting these yields the non-unique affiliation count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliationReference {
    pub source_id: String,
    pub ror: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorRecord {
    pub given_name: String,
    pub family_name: String,
    pub orcid: Option<String>,
    pub affiliations: Vec<AffiliationRecord>,
}

/// Output of every author parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAuthors {
    pub authors: Vec<AuthorRecord>,
    pub affiliations: Vec<AffiliationReference>,
}

impl ParsedAuthors {
    /// Authors carrying an ORCID
    pub fn orcid_count(&self) -> usize {
        self.authors.iter().filter(|a| a.orcid.is_some()).count()
    }

    /// References whose affiliation resolved to a ROR id
    pub fn ror_count(&self) -> usize {
        self.affiliations.iter().filter(|a| a.ror.is_some()).count()
    }
}

/// A data-availability statement, kept verbatim as found in the markup.
pub type DatasetStatement = String;

/// Everything the dispatcher pulled out of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub authors: Vec<AuthorRecord>,
    pub affiliations: Vec<AffiliationReference>,
    pub datasets: Vec<DatasetStatement>,
}

impl Extraction {
    pub fn orcid_count(&self) -> usize {
        self.authors.iter().filter(|a| a.orcid.is_some()).count()
    }

    pub fn ror_count(&self) -> usize {
        self.affiliations.iter().filter(|a| a.ror.is_some()).count()
    }
}

impl From<ParsedAuthors> for Extraction {
    fn from(parsed: ParsedAuthors) -> Self {
        Self {
            authors: parsed.authors,
            affiliations: parsed.affiliations,
            datasets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(orcid: Option<&str>) -> AuthorRecord {
        AuthorRecord {
            orcid: orcid.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn counts_ignore_missing_identifiers() {
        let parsed = ParsedAuthors {
            authors: vec![author(Some("0000-0001")), author(None), author(Some("0000-0002"))],
            affiliations: vec![
                AffiliationReference {
                    source_id: "a1".into(),
                    ror: Some("https://ror.org/01".into()),
                },
                AffiliationReference {
                    source_id: "a9".into(),
                    ror: None,
                },
            ],
        };
        assert_eq!(parsed.orcid_count(), 2);
        assert_eq!(parsed.ror_count(), 1);

        let extraction = Extraction::from(parsed);
        assert_eq!(extraction.orcid_count(), 2);
        assert_eq!(extraction.ror_count(), 1);
        assert!(extraction.datasets.is_empty());
    }
}
