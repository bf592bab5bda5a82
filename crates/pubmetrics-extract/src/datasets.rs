//! Data-availability statement extractors
//!
//! Statements are returned as verbatim markup fragments, never re-serialized.

use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use regex::Regex;

use crate::error::MalformedDocument;
use crate::model::DatasetStatement;
use crate::xml::{self, Shape, XmlReader, XmlResult, has_attribute, malformed, next_event};

/// Pulls dataset statements out of one raw document.
pub trait DatasetExtractor: Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, document: &[u8]) -> Result<Vec<DatasetStatement>, MalformedDocument>;
}

static ELSEVIER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<ce:data-availability.*?</ce:data-availability>")
        .expect("valid data-availability regex")
});

/// Elsevier `ce:data-availability` blocks.
///
/// Works on lossily decoded text with a non-greedy pattern, so it never fails
/// and tolerates documents that are not well-formed. `.` does not cross line
/// breaks: a block split over several lines is not reported.
pub struct ElsevierDatasets;

impl DatasetExtractor for ElsevierDatasets {
    fn name(&self) -> &'static str {
        "elsevier"
    }

    fn extract(&self, document: &[u8]) -> Result<Vec<DatasetStatement>, MalformedDocument> {
        let text = xml::decode(document);
        Ok(ELSEVIER_BLOCK
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect())
    }
}

/// Hindawi `sec[@sec-type='data-availability']` sections, nested ones
/// included, ordered by start tag.
pub struct HindawiDatasets;

impl DatasetExtractor for HindawiDatasets {
    fn name(&self) -> &'static str {
        "hindawi"
    }

    fn extract(&self, document: &[u8]) -> Result<Vec<DatasetStatement>, MalformedDocument> {
        data_availability_sections(&xml::decode(document))
    }
}

fn data_availability_sections(xml: &str) -> XmlResult<Vec<DatasetStatement>> {
    let mut reader = xml::reader(xml);
    let mut shape = Shape::default();
    // start offset for each open element that is a statement section
    let mut open: Vec<Option<usize>> = Vec::new();
    let mut found: Vec<(usize, DatasetStatement)> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match next_event(&mut reader, &mut buf)? {
            Event::Start(e) => {
                shape.open(&reader)?;
                let end = offset(&reader);
                // `<` + tag content + `>`
                let start = is_statement(&reader, &e)?.then(|| end - e.len() - 2);
                open.push(start);
            }
            Event::Empty(e) => {
                shape.leaf(&reader)?;
                if is_statement(&reader, &e)? {
                    let end = offset(&reader);
                    // `<` + tag content + `/>`
                    let start = end - e.len() - 3;
                    found.push((start, slice(&reader, xml, start, end)?));
                }
            }
            Event::End(_) => {
                shape.close(&reader)?;
                if let Some(Some(start)) = open.pop() {
                    let end = offset(&reader);
                    found.push((start, slice(&reader, xml, start, end)?));
                }
            }
            Event::Text(e) => shape.text(&reader, &e)?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    shape.finish(&reader)?;

    // inner sections close first
    found.sort_by_key(|(start, _)| *start);
    Ok(found.into_iter().map(|(_, statement)| statement).collect())
}

fn is_statement(reader: &XmlReader<'_>, e: &BytesStart<'_>) -> XmlResult<bool> {
    Ok(e.name().as_ref() == b"sec" && has_attribute(reader, e, b"sec-type", "data-availability")?)
}

fn offset(reader: &XmlReader<'_>) -> usize {
    xml::position(reader) as usize
}

fn slice(reader: &XmlReader<'_>, xml: &str, start: usize, end: usize) -> XmlResult<String> {
    xml.get(start..end)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| malformed(reader, format!("bad section bounds {start}..{end}")))
}
