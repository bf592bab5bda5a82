//! Publisher dispatch: one document in, one [`Extraction`] out.

use crate::error::MalformedDocument;
use crate::model::Extraction;
use crate::publisher::Publisher;
use crate::xml;

/// Run the publisher's author parser and dataset extractor over `document`.
///
/// Unsupported publishers, and publishers with neither strategy, get an
/// empty extraction.
pub fn dispatch(publisher: &Publisher, document: &[u8]) -> Result<Extraction, MalformedDocument> {
    let Some(schema) = publisher.schema() else {
        return Ok(Extraction::default());
    };

    let mut extraction = match schema.authors {
        Some(parser) => Extraction::from(parser.parse(&xml::decode(document))?),
        None => Extraction::default(),
    };
    if let Some(extractor) = schema.datasets {
        extraction.datasets = extractor.extract(document)?;
    }

    log::trace!(
        "{publisher}: {} authors, {} references, {} statements",
        extraction.authors.len(),
        extraction.affiliations.len(),
        extraction.datasets.len()
    );
    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HINDAWI: &str = r#"<article>
  <front><article-meta>
    <contrib-group>
      <contrib contrib-type="author">
        <name><surname>Noether</surname><given-names>Emmy</given-names></name>
        <xref ref-type="aff" rid="h1"/>
      </contrib>
    </contrib-group>
    <aff id="h1"><institution-wrap><institution>Göttingen</institution></institution-wrap></aff>
  </article-meta></front>
  <back><sec sec-type="data-availability"><p>On request.</p></sec></back>
</article>"#;

    #[test]
    fn scenario_unknown_publisher_is_empty() {
        let extraction = dispatch(&Publisher::from_name("Wiley"), HINDAWI.as_bytes()).unwrap();
        assert_eq!(extraction, Extraction::default());
    }

    #[test]
    fn hindawi_runs_both_strategies() {
        let extraction = dispatch(&Publisher::Hindawi, HINDAWI.as_bytes()).unwrap();
        assert_eq!(extraction.authors.len(), 1);
        assert_eq!(extraction.affiliations.len(), 1);
        assert_eq!(
            extraction.datasets,
            ["<sec sec-type=\"data-availability\"><p>On request.</p></sec>"]
        );
    }

    #[test]
    fn aps_ignores_dataset_sections() {
        let extraction = dispatch(&Publisher::Aps, HINDAWI.as_bytes()).unwrap();
        assert_eq!(extraction.authors.len(), 1);
        assert!(extraction.datasets.is_empty());
    }

    #[test]
    fn elsevier_tolerates_broken_markup() {
        let doc = b"<ce:data-availability>x</ce:data-availability><unclosed";
        let extraction = dispatch(&Publisher::Elsevier, doc).unwrap();
        assert!(extraction.authors.is_empty());
        assert_eq!(extraction.datasets.len(), 1);
    }

    #[test]
    fn malformed_document_is_an_error_for_xml_parsers() {
        assert!(dispatch(&Publisher::Springer, b"<Article><AuthorGroup>").is_err());
    }
}
