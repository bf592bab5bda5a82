//! Springer (A++) author parser
//!
//! Authors sit directly under `AuthorGroup` or one level deeper under
//! `AuthorGroup/InstitutionalAuthor`. Direct authors come first in the output,
//! then the nested ones group by group.

use quick_xml::events::{BytesStart, Event};

use super::AuthorParser;
use crate::affiliation::AffiliationTable;
use crate::error::MalformedDocument;
use crate::model::{AffiliationRecord, AffiliationReference, AuthorRecord, ParsedAuthors};
use crate::xml::{
    Visit, XmlReader, XmlResult, attribute, malformed, next_event, non_empty, parent_is,
    read_text_content, skip_element, walk,
};

pub struct SpringerAuthors;

impl AuthorParser for SpringerAuthors {
    fn name(&self) -> &'static str {
        "springer"
    }

    fn parse(&self, xml: &str) -> Result<ParsedAuthors, MalformedDocument> {
        let table = AffiliationTable::from_springer(xml)?;
        parse_authors(xml, &table)
    }
}

/// One `<Author>` as written.
#[derive(Debug, Default)]
struct SpringerAuthor {
    given_name: Option<String>,
    family_name: Option<String>,
    orcid: Option<String>,
    affiliation_ids: Option<String>,
}

/// Resolve every author's `AffiliationIDS` tokens against `table`.
///
/// Unlike JATS, an unknown id still gets an affiliation entry (id only, no
/// name or ROR) on the author.
pub fn parse_authors(
    xml: &str,
    table: &AffiliationTable,
) -> Result<ParsedAuthors, MalformedDocument> {
    let mut direct = Vec::new();
    let mut nested = Vec::new();

    walk(xml, |reader, e, path, empty| {
        if e.name().as_ref() != b"Author" {
            return Ok(Visit::Descend);
        }
        let target = if parent_is(path, b"AuthorGroup") {
            &mut direct
        } else if parent_is(path, b"InstitutionalAuthor")
            && parent_is(&path[..path.len() - 1], b"AuthorGroup")
        {
            &mut nested
        } else {
            return Ok(Visit::Descend);
        };
        target.push(parse_author(reader, e, empty)?);
        Ok(Visit::Consumed)
    })?;

    let mut parsed = ParsedAuthors::default();
    for raw in direct.into_iter().chain(nested) {
        let mut author = AuthorRecord {
            given_name: raw.given_name.unwrap_or_default(),
            family_name: raw.family_name.unwrap_or_default(),
            orcid: raw.orcid,
            affiliations: Vec::new(),
        };
        for token in raw.affiliation_ids.as_deref().unwrap_or("").split_whitespace() {
            let record = table
                .get(token)
                .cloned()
                .unwrap_or_else(|| AffiliationRecord {
                    id: token.to_string(),
                    ..Default::default()
                });
            parsed.affiliations.push(AffiliationReference {
                source_id: token.to_string(),
                ror: record.ror.clone(),
            });
            author.affiliations.push(record);
        }
        parsed.authors.push(author);
    }

    Ok(parsed)
}

fn parse_author(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    empty: bool,
) -> XmlResult<SpringerAuthor> {
    let mut author = SpringerAuthor {
        orcid: attribute(reader, start, b"ORCID")?.and_then(non_empty),
        affiliation_ids: attribute(reader, start, b"AffiliationIDS")?,
        ..Default::default()
    };
    if empty {
        return Ok(author);
    }

    let mut buf = Vec::new();
    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"AuthorName" => {
                parse_author_name(reader, &mut author)?;
            }
            Event::Start(e) => skip_element(reader, e.name().as_ref())?,
            Event::End(e) if e.name().as_ref() == b"Author" => break,
            Event::Eof => return Err(malformed(reader, "unclosed <Author>")),
            _ => {}
        }
        buf.clear();
    }

    Ok(author)
}

fn parse_author_name(reader: &mut XmlReader<'_>, author: &mut SpringerAuthor) -> XmlResult<()> {
    let mut buf = Vec::new();

    loop {
        match next_event(reader, &mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                // several GivenName elements are common ("John", "F."); keep the first
                b"GivenName" => {
                    let text = read_text_content(reader, b"GivenName")?;
                    author.given_name = author.given_name.take().or_else(|| non_empty(text));
                }
                b"FamilyName" => {
                    let text = read_text_content(reader, b"FamilyName")?;
                    author.family_name = author.family_name.take().or_else(|| non_empty(text));
                }
                name => skip_element(reader, name)?,
            },
            Event::End(e) if e.name().as_ref() == b"AuthorName" => break,
            Event::Eof => return Err(malformed(reader, "unclosed <AuthorName>")),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPRINGER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Publisher>
  <Journal>
    <Volume><Issue><Article ID="s10052-024-0001">
      <ArticleHeader>
        <AuthorGroup>
          <Author AffiliationIDS="Aff1 Aff2" ORCID="0000-0001-0002-0003">
            <AuthorName DisplayOrder="Western">
              <GivenName>Lise</GivenName>
              <FamilyName>Meitner</FamilyName>
            </AuthorName>
          </Author>
          <InstitutionalAuthor>
            <InstitutionalAuthorName>ATLAS Collaboration</InstitutionalAuthorName>
            <Author AffiliationIDS="Aff1">
              <AuthorName><GivenName>Otto</GivenName><FamilyName>Hahn</FamilyName></AuthorName>
            </Author>
            <Author AffiliationIDS="">
              <AuthorName><FamilyName>Frisch</FamilyName></AuthorName>
            </Author>
          </InstitutionalAuthor>
          <Author AffiliationIDS="Aff2" ORCID="">
            <AuthorName><GivenName>Fritz</GivenName><FamilyName>Strassmann</FamilyName></AuthorName>
          </Author>
          <Affiliation ID="Aff1">
            <OrgName>Kaiser Wilhelm Institute</OrgName>
            <OrgID Type="ROR">https://ror.org/000000001</OrgID>
          </Affiliation>
          <Affiliation ID="Aff2">
            <OrgName>University of Stockholm</OrgName>
          </Affiliation>
        </AuthorGroup>
      </ArticleHeader>
    </Article></Issue></Volume>
  </Journal>
</Publisher>"#;

    #[test]
    fn direct_authors_precede_institutional_ones() {
        let parsed = SpringerAuthors.parse(SPRINGER).unwrap();
        let families: Vec<&str> = parsed
            .authors
            .iter()
            .map(|a| a.family_name.as_str())
            .collect();
        assert_eq!(families, ["Meitner", "Strassmann", "Hahn", "Frisch"]);
    }

    #[test]
    fn names_orcid_and_defaults() {
        let parsed = SpringerAuthors.parse(SPRINGER).unwrap();
        assert_eq!(parsed.authors[0].given_name, "Lise");
        assert_eq!(parsed.authors[0].orcid.as_deref(), Some("0000-0001-0002-0003"));
        // empty ORCID attribute counts as absent
        assert_eq!(parsed.authors[1].orcid, None);
        assert_eq!(parsed.authors[3].given_name, "");
        assert_eq!(parsed.orcid_count(), 1);
    }

    #[test]
    fn references_follow_author_order() {
        let parsed = SpringerAuthors.parse(SPRINGER).unwrap();
        let ids: Vec<&str> = parsed
            .affiliations
            .iter()
            .map(|r| r.source_id.as_str())
            .collect();
        assert_eq!(ids, ["Aff1", "Aff2", "Aff2", "Aff1"]);
        assert_eq!(parsed.ror_count(), 2);
    }

    #[test]
    fn scenario_unresolved_id_still_counts() {
        let xml = r#"<Article><AuthorGroup>
  <Author AffiliationIDS="x1"><AuthorName><FamilyName>A</FamilyName></AuthorName></Author>
  <InstitutionalAuthor>
    <Author AffiliationIDS="x1 x2"><AuthorName><FamilyName>B</FamilyName></AuthorName></Author>
  </InstitutionalAuthor>
  <Affiliation ID="x1"><OrgName>Known</OrgName></Affiliation>
</AuthorGroup></Article>"#;
        let parsed = SpringerAuthors.parse(xml).unwrap();
        assert_eq!(parsed.authors.len(), 2);
        assert_eq!(parsed.affiliations.len(), 3);

        // the unresolved id is still appended to the author, with empty fields
        let nested = &parsed.authors[1];
        assert_eq!(nested.affiliations.len(), 2);
        assert_eq!(nested.affiliations[1].id, "x2");
        assert_eq!(nested.affiliations[1].name, None);
        assert_eq!(nested.affiliations[1].ror, None);
    }

    #[test]
    fn author_outside_author_group_is_ignored() {
        let xml = r#"<Article><Bibliography><Author AffiliationIDS="x1"/></Bibliography></Article>"#;
        let parsed = SpringerAuthors.parse(xml).unwrap();
        assert!(parsed.authors.is_empty());
        assert!(parsed.affiliations.is_empty());
    }

    #[test]
    fn self_closing_author_keeps_attributes() {
        let xml = r#"<Article><AuthorGroup><Author AffiliationIDS="a b" ORCID="0000-0009"/></AuthorGroup></Article>"#;
        let parsed = SpringerAuthors.parse(xml).unwrap();
        assert_eq!(parsed.authors.len(), 1);
        assert_eq!(parsed.authors[0].orcid.as_deref(), Some("0000-0009"));
        assert_eq!(parsed.affiliations.len(), 2);
    }
}
