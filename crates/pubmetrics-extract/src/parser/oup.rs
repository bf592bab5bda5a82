//! OUP author parser
//!
//! OUP documents are JATS, but only the front-matter contributor group is
//! authoritative and the affiliation markup is unreliable, so affiliation
//! counts come from the repository store instead.

use super::AuthorParser;
use super::jats::parse_contrib;
use crate::error::MalformedDocument;
use crate::model::ParsedAuthors;
use crate::xml::{Visit, has_attribute, walk};

/// Ancestors of an OUP author `contrib` below the root element.
const CONTRIB_PATH: [&[u8]; 3] = [b"front", b"article-meta", b"contrib-group"];

pub struct OupAuthors;

impl AuthorParser for OupAuthors {
    fn name(&self) -> &'static str {
        "oup"
    }

    /// Authors only; the reference sequence is always empty.
    fn parse(&self, xml: &str) -> Result<ParsedAuthors, MalformedDocument> {
        let mut parsed = ParsedAuthors::default();

        walk(xml, |reader, e, path, empty| {
            if e.name().as_ref() != b"contrib"
                || !at_contrib_path(path)
                || !has_attribute(reader, e, b"contrib-type", "author")?
            {
                return Ok(Visit::Descend);
            }
            let contrib = if empty {
                Default::default()
            } else {
                parse_contrib(reader)?
            };
            let (author, _) = contrib.into_parts();
            parsed.authors.push(author);
            Ok(Visit::Consumed)
        })?;

        Ok(parsed)
    }
}

fn at_contrib_path(path: &[Vec<u8>]) -> bool {
    path.len() == CONTRIB_PATH.len() + 1
        && path[1..]
            .iter()
            .zip(CONTRIB_PATH)
            .all(|(have, want)| have.as_slice() == want)
}
