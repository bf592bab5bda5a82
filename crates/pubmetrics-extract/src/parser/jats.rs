//! JATS author parser (APS, Hindawi)
//!
//! Authors are `contrib[@contrib-type='author']` children of any
//! `contrib-group`. Each `xref[@ref-type='aff']` carries a `rid` that may hold
//! several whitespace-separated affiliation ids. Collaboration members in a
//! `contrib-group` nested inside an author follow that author.

use quick_xml::events::{BytesStart, Event};

use super::AuthorParser;
use crate::affiliation::AffiliationTable;
use crate::error::MalformedDocument;
use crate::model::{AffiliationReference, AuthorRecord, ParsedAuthors};
use crate::xml::{
    Visit, XmlReader, XmlResult, attribute, has_attribute, malformed, next_event, non_empty,
    parent_is, read_text_content, skip_element, walk,
};

pub struct JatsAuthors;

impl AuthorParser for JatsAuthors {
    fn name(&self) -> &'static str {
        "jats"
    }

    fn parse(&self, xml: &str) -> Result<ParsedAuthors, MalformedDocument> {
        let table = AffiliationTable::from_jats(xml)?;
        parse_authors(xml, &table)
    }
}

/// One `<contrib>` as written, before affiliation ids are resolved.
#[derive(Debug, Default)]
pub(crate) struct Contrib {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub orcid: Option<String>,
    /// Raw `rid` values of `xref[@ref-type='aff']`, unsplit
    pub aff_rids: Vec<String>,
    /// Author contribs of any `contrib-group` below this one, in document order
    pub nested: Vec<Contrib>,
}

impl Contrib {
    /// Author without affiliations, plus the unresolved `rid` values.
    pub(crate) fn into_parts(self) -> (AuthorRecord, Vec<String>) {
        let author = AuthorRecord {
            given_name: self.given_name.unwrap_or_default(),
            family_name: self.family_name.unwrap_or_default(),
            orcid: self.orcid,
            affiliations: Vec::new(),
        };
        (author, self.aff_rids)
    }
}

/// Resolve every author's reference tokens against `table`.
///
/// Each token yields a reference even when the id is unknown (ROR `None`);
/// only known ids are appended to the author's affiliation list.
pub fn parse_authors(
    xml: &str,
    table: &AffiliationTable,
) -> Result<ParsedAuthors, MalformedDocument> {
    let mut parsed = ParsedAuthors::default();

    walk(xml, |reader, e, path, empty| {
        if e.name().as_ref() != b"contrib"
            || !parent_is(path, b"contrib-group")
            || !has_attribute(reader, e, b"contrib-type", "author")?
        {
            return Ok(Visit::Descend);
        }
        let contrib = if empty {
            Contrib::default()
        } else {
            parse_contrib(reader)?
        };
        push_contrib(&mut parsed, table, contrib);
        Ok(Visit::Consumed)
    })?;

    Ok(parsed)
}

fn push_contrib(parsed: &mut ParsedAuthors, table: &AffiliationTable, mut contrib: Contrib) {
    let nested = std::mem::take(&mut contrib.nested);
    let (mut author, rids) = contrib.into_parts();
    for token in rids.iter().flat_map(|rid| rid.split_whitespace()) {
        parsed.affiliations.push(AffiliationReference {
            source_id: token.to_string(),
            ror: table.ror(token),
        });
        if let Some(record) = table.get(token) {
            author.affiliations.push(record.clone());
        }
    }
    parsed.authors.push(author);

    for member in nested {
        push_contrib(parsed, table, member);
    }
}

/// Read the children of a `<contrib>` just opened.
pub(crate) fn parse_contrib(reader: &mut XmlReader<'_>) -> XmlResult<Contrib> {
    let mut contrib = Contrib::default();
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"name" => parse_name(reader, &mut contrib)?,
                b"contrib-id" => {
                    let is_orcid = has_attribute(reader, &e, b"contrib-id-type", "orcid")?;
                    let text = read_text_content(reader, b"contrib-id")?;
                    if is_orcid && contrib.orcid.is_none() {
                        contrib.orcid = non_empty(text);
                    }
                }
                b"xref" => {
                    push_aff_rid(reader, &e, &mut contrib)?;
                    skip_element(reader, b"xref")?;
                }
                name => parse_nested(reader, name, &mut contrib.nested)?,
            },
            Event::Empty(e) if e.name().as_ref() == b"xref" => {
                push_aff_rid(reader, &e, &mut contrib)?;
            }
            Event::End(e) if e.name().as_ref() == b"contrib" => break,
            Event::Eof => return Err(malformed(reader, "unclosed <contrib>")),
            _ => {}
        }
        buf.clear();
    }

    Ok(contrib)
}

/// Collect author contribs anywhere below the element `name` just opened.
///
/// Only `contrib` elements whose parent is a `contrib-group` count, matching
/// the top-level rule.
fn parse_nested(
    reader: &mut XmlReader<'_>,
    name: &[u8],
    nested: &mut Vec<Contrib>,
) -> XmlResult<()> {
    let in_group = name == b"contrib-group";
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) => {
                let child = e.name();
                if in_group
                    && child.as_ref() == b"contrib"
                    && has_attribute(reader, &e, b"contrib-type", "author")?
                {
                    nested.push(parse_contrib(reader)?);
                } else {
                    parse_nested(reader, child.as_ref(), nested)?;
                }
            }
            Event::Empty(e) if in_group && e.name().as_ref() == b"contrib" => {
                if has_attribute(reader, &e, b"contrib-type", "author")? {
                    nested.push(Contrib::default());
                }
            }
            Event::End(e) if e.name().as_ref() == name => break,
            Event::Eof => return Err(malformed(reader, "unclosed element inside <contrib>")),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn push_aff_rid(
    reader: &XmlReader<'_>,
    e: &BytesStart<'_>,
    contrib: &mut Contrib,
) -> XmlResult<()> {
    if has_attribute(reader, e, b"ref-type", "aff")? {
        if let Some(rid) = attribute(reader, e, b"rid")? {
            contrib.aff_rids.push(rid);
        }
    }
    Ok(())
}

fn parse_name(reader: &mut XmlReader<'_>, contrib: &mut Contrib) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"given-names" => {
                    let text = read_text_content(reader, b"given-names")?;
                    contrib.given_name = contrib.given_name.take().or_else(|| non_empty(text));
                }
                b"surname" => {
                    let text = read_text_content(reader, b"surname")?;
                    contrib.family_name = contrib.family_name.take().or_else(|| non_empty(text));
                }
                name => skip_element(reader, name)?,
            },
            Event::End(e) if e.name().as_ref() == b"name" => break,
            Event::Eof => return Err(malformed(reader, "unclosed <name>")),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
