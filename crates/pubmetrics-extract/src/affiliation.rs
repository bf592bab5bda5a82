//! Per-document affiliation lookup
//!
//! Built once from a document's affiliation elements, then only read while the
//! author parsers resolve reference tokens against it.

use quick_xml::events::Event;
use rustc_hash::FxHashMap;

use crate::error::MalformedDocument;
use crate::model::AffiliationRecord;
use crate::xml::{
    Visit, XmlReader, XmlResult, attribute, has_attribute, malformed, next_event, non_empty,
    read_text_content, skip_element, walk,
};

/// Document-local affiliation id → record.
#[derive(Debug, Default)]
pub struct AffiliationTable {
    records: FxHashMap<String, AffiliationRecord>,
}

impl AffiliationTable {
    /// Collect every JATS `<aff id="...">` (APS, Hindawi).
    ///
    /// Name comes from `institution-wrap/institution`, ROR from
    /// `institution-wrap/institution-id[@institution-id-type='ror']`.
    pub fn from_jats(xml: &str) -> Result<Self, MalformedDocument> {
        let mut table = Self::default();
        walk(xml, |reader, e, _, empty| {
            if e.name().as_ref() != b"aff" {
                return Ok(Visit::Descend);
            }
            let id = attribute(reader, e, b"id")?;
            let mut record = AffiliationRecord::default();
            if !empty {
                parse_jats_aff(reader, &mut record)?;
            }
            table.insert(id, record);
            Ok(Visit::Consumed)
        })?;
        Ok(table)
    }

    /// Collect every Springer `<Affiliation ID="...">`.
    ///
    /// Name comes from `OrgName`, ROR from `OrgID[@Type='ROR']`.
    pub fn from_springer(xml: &str) -> Result<Self, MalformedDocument> {
        let mut table = Self::default();
        walk(xml, |reader, e, _, empty| {
            if e.name().as_ref() != b"Affiliation" {
                return Ok(Visit::Descend);
            }
            let id = attribute(reader, e, b"ID")?;
            let mut record = AffiliationRecord::default();
            if !empty {
                parse_springer_affiliation(reader, &mut record)?;
            }
            table.insert(id, record);
            Ok(Visit::Consumed)
        })?;
        Ok(table)
    }

    /// Elements without an id cannot be referenced and are dropped. A repeated
    /// id keeps the last declaration.
    fn insert(&mut self, id: Option<String>, mut record: AffiliationRecord) {
        let Some(id) = id.and_then(non_empty) else {
            log::trace!("skipping affiliation without id");
            return;
        };
        record.id = id.clone();
        self.records.insert(id, record);
    }

    pub fn get(&self, id: &str) -> Option<&AffiliationRecord> {
        self.records.get(id)
    }

    /// ROR of `id`, `None` when the id is unknown or has no ROR.
    pub fn ror(&self, id: &str) -> Option<String> {
        self.get(id).and_then(|r| r.ror.clone())
    }
}

fn parse_jats_aff(reader: &mut XmlReader<'_>, record: &mut AffiliationRecord) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"institution-wrap" => {
                parse_institution_wrap(reader, record)?;
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if e.name().as_ref() == b"aff" => break,
            Event::Eof => return Err(malformed(reader, "unclosed <aff>")),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_institution_wrap(
    reader: &mut XmlReader<'_>,
    record: &mut AffiliationRecord,
) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"institution" => {
                    let text = read_text_content(reader, b"institution")?;
                    if record.name.is_none() {
                        record.name = non_empty(text);
                    }
                }
                b"institution-id" => {
                    let is_ror = has_attribute(reader, &e, b"institution-id-type", "ror")?;
                    let text = read_text_content(reader, b"institution-id")?;
                    if is_ror && record.ror.is_none() {
                        record.ror = non_empty(text);
                    }
                }
                name => skip_element(reader, name)?,
            },
            Event::End(e) if e.name().as_ref() == b"institution-wrap" => break,
            Event::Eof => return Err(malformed(reader, "unclosed <institution-wrap>")),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_springer_affiliation(
    reader: &mut XmlReader<'_>,
    record: &mut AffiliationRecord,
) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"OrgName" => {
                    let text = read_text_content(reader, b"OrgName")?;
                    if record.name.is_none() {
                        record.name = non_empty(text);
                    }
                }
                b"OrgID" => {
                    let is_ror = has_attribute(reader, &e, b"Type", "ROR")?;
                    let text = read_text_content(reader, b"OrgID")?;
                    if is_ror && record.ror.is_none() {
                        record.ror = non_empty(text);
                    }
                }
                name => skip_element(reader, name)?,
            },
            Event::End(e) if e.name().as_ref() == b"Affiliation" => break,
            Event::Eof => return Err(malformed(reader, "unclosed <Affiliation>")),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
