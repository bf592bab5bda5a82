//! End-to-end export over in-memory collaborators

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use pubmetrics_core::{FetchError, ProgressContext, RetryPolicy};
use pubmetrics_extract::{
    ArticleCursor, ArticleRecord, ArticleSource, Collaborators, Column, DateRange, ExportConfig,
    FileStore, MetricValue, Publisher, RepositoryAffiliations, run,
};
use rustc_hash::FxHashMap;

struct Index {
    articles: Vec<ArticleRecord>,
    /// Sets the flag after this many articles were handed out
    cancel_after: Option<(usize, &'static AtomicBool)>,
    served: AtomicUsize,
}

impl Index {
    fn new(articles: Vec<ArticleRecord>) -> Self {
        Self {
            articles,
            cancel_after: None,
            served: AtomicUsize::new(0),
        }
    }
}

impl ArticleSource for Index {
    fn articles(&self, range: &DateRange) -> Result<ArticleCursor<'_>, FetchError> {
        let range = *range;
        Ok(Box::new(
            self.articles
                .iter()
                .filter(move |a| range.contains(a.publication_date))
                .map(move |a| {
                    let served = self.served.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some((limit, flag)) = self.cancel_after {
                        if served >= limit {
                            flag.store(true, Ordering::Relaxed);
                        }
                    }
                    Ok(a.clone())
                }),
        ))
    }
}

#[derive(Default)]
struct Files(FxHashMap<String, Vec<u8>>);

impl FileStore for Files {
    fn fetch(&self, suffix: &str) -> Result<Option<Vec<u8>>, FetchError> {
        Ok(self
            .0
            .iter()
            .find(|(key, _)| key.contains(suffix))
            .map(|(_, bytes)| bytes.clone()))
    }
}

#[derive(Default)]
struct Repository {
    authors: FxHashMap<String, Vec<String>>,
    counts: FxHashMap<String, usize>,
}

impl RepositoryAffiliations for Repository {
    fn author_ids(&self, article_id: &str) -> Result<Vec<String>, FetchError> {
        Ok(self.authors.get(article_id).cloned().unwrap_or_default())
    }

    fn affiliation_count(&self, author_id: &str) -> Result<usize, FetchError> {
        Ok(self.counts.get(author_id).copied().unwrap_or(0))
    }
}

fn article(id: u32, date: &str, publisher: &str) -> ArticleRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "publication_date": date,
        "publication_info": [{"journal_title": "Journal", "publisher": publisher}],
        "article_identifiers": [{"identifier_type": "DOI", "identifier_value": format!("10.1/{id}")}],
        "authors": [{}, {}],
        "related_files": [{"file": format!("https://repo/ch/media/files/{id}/{id}.xml")}],
        "related_materials": [{"related_material_type": "dataset"}]
    }))
    .unwrap()
}

fn config(publisher: Publisher) -> ExportConfig {
    ExportConfig {
        workers: 2,
        batch_size: 2,
        retry: RetryPolicy::none(),
        ..ExportConfig::new(publisher)
    }
}

const APS_DOC: &str = r#"<article><front><article-meta>
  <contrib-group>
    <contrib contrib-type="author">
      <contrib-id contrib-id-type="orcid">0000-0001-0000-0001</contrib-id>
      <xref ref-type="aff" rid="a1 a2"/>
    </contrib>
  </contrib-group>
  <aff id="a1"><institution-wrap><institution>One</institution><institution-id institution-id-type="ror">https://ror.org/1</institution-id></institution-wrap></aff>
  <aff id="a2"><institution-wrap><institution>Two</institution></institution-wrap></aff>
</article-meta></front></article>"#;

fn files_for(ids: &[u32], doc: &str) -> Files {
    let mut files = Files::default();
    for id in ids {
        files.0.insert(
            format!("storage/files/{id}/{id}.xml"),
            doc.as_bytes().to_vec(),
        );
    }
    files
}

#[test]
fn every_publisher_yields_rows_of_header_length() {
    let repository = Repository::default();
    for name in ["APS", "Springer", "Hindawi", "OUP", "Elsevier", "Wiley"] {
        let index = Index::new(vec![article(1, "2024-10-02", name), article(2, "2024-11-02", name)]);
        let files = files_for(&[1, 2], APS_DOC);
        let collaborators = Collaborators {
            files: &files,
            repository: &repository,
        };
        let export = run(
            &config(Publisher::from_name(name)),
            &index,
            collaborators,
            &AtomicBool::new(false),
            &ProgressContext::hidden(),
        )
        .unwrap();

        assert_eq!(export.table.len(), 2, "{name}");
        assert!(
            export.table.rows.iter().all(|r| r.len() == export.table.header.len()),
            "{name}"
        );
    }
}

#[test]
fn aps_export_counts_and_order() {
    let index = Index::new(vec![
        article(1, "2024-10-02", "APS"),
        article(2, "2024-10-03", "Springer"),
        article(3, "2024-10-04", "APS"),
        article(4, "2024-12-30", "APS"),
        article(5, "2025-01-01", "APS"),
    ]);
    let files = files_for(&[1, 3, 4], APS_DOC);
    let repository = Repository::default();
    let collaborators = Collaborators {
        files: &files,
        repository: &repository,
    };
    let mut config = config(Publisher::Aps);
    config.range = DateRange::parse(Some("2024-10-01"), Some("2024-12-31")).unwrap();

    let export = run(
        &config,
        &index,
        collaborators,
        &AtomicBool::new(false),
        &ProgressContext::hidden(),
    )
    .unwrap();

    assert_eq!(export.summary.matched, 3);
    assert_eq!(export.summary.exported, 3);
    assert!(!export.summary.cancelled);

    let doi = export.table.header.iter().position(|&c| c == Column::Doi).unwrap();
    let dois: Vec<_> = export.table.rows.iter().map(|r| r[doi].to_string()).collect();
    assert_eq!(dois, ["10.1/1", "10.1/3", "10.1/4"]);

    let affs = export
        .table
        .header
        .iter()
        .position(|&c| c == Column::NonUniqueAffiliations)
        .unwrap();
    assert_eq!(export.table.rows[0][affs], MetricValue::Int(2));
}

#[test]
fn malformed_documents_are_skipped() {
    let index = Index::new(vec![
        article(1, "2024-10-02", "Springer"),
        article(2, "2024-10-03", "Springer"),
        article(3, "2024-10-04", "Springer"),
    ]);
    let mut files = files_for(&[1, 3], "<Article><AuthorGroup/></Article>");
    files.0.insert(
        "storage/files/2/2.xml".into(),
        b"<Article><AuthorGroup>".to_vec(),
    );
    let repository = Repository::default();
    let collaborators = Collaborators {
        files: &files,
        repository: &repository,
    };

    let export = run(
        &config(Publisher::Springer),
        &index,
        collaborators,
        &AtomicBool::new(false),
        &ProgressContext::hidden(),
    )
    .unwrap();

    assert_eq!(export.summary.matched, 3);
    assert_eq!(export.summary.exported, 2);
    assert_eq!(export.summary.skipped_malformed, 1);
}

#[test]
fn cancellation_stops_between_articles() {
    static CANCEL: AtomicBool = AtomicBool::new(false);

    let articles = (1..=20).map(|id| article(id, "2024-10-02", "Elsevier")).collect();
    let index = Index {
        cancel_after: Some((3, &CANCEL)),
        ..Index::new(articles)
    };
    let files = Files::default();
    let repository = Repository::default();
    let collaborators = Collaborators {
        files: &files,
        repository: &repository,
    };

    let export = run(
        &config(Publisher::Elsevier),
        &index,
        collaborators,
        &CANCEL,
        &ProgressContext::hidden(),
    )
    .unwrap();

    assert!(export.summary.cancelled);
    assert!(export.table.len() < 20);
}

#[test]
fn scenario_unknown_publisher_exports_base_columns() {
    let index = Index::new(vec![article(7, "2024-10-02", "Wiley")]);
    let files = files_for(&[7], APS_DOC);
    let repository = Repository::default();
    let collaborators = Collaborators {
        files: &files,
        repository: &repository,
    };

    let export = run(
        &config(Publisher::from_name("Wiley")),
        &index,
        collaborators,
        &AtomicBool::new(false),
        &ProgressContext::hidden(),
    )
    .unwrap();

    let labels: Vec<_> = export.table.header.iter().map(|c| c.label()).collect();
    assert_eq!(
        labels,
        [
            "year",
            "journal",
            "doi",
            "publication date",
            "arxiv number",
            "primary arxiv category",
            "total number of authors",
            "total number of related materials, type dataset",
            "total number of related materials, type software",
        ]
    );
    assert_eq!(export.table.rows[0].len(), 9);
}

#[test]
fn oup_uses_repository_counts() {
    let index = Index::new(vec![article(1, "2024-10-02", "OUP")]);
    let files = files_for(&[1], APS_DOC);
    let mut repository = Repository::default();
    repository
        .authors
        .insert("1".into(), vec!["x".into(), "y".into()]);
    repository.counts.insert("x".into(), 2);
    repository.counts.insert("y".into(), 1);
    let collaborators = Collaborators {
        files: &files,
        repository: &repository,
    };

    let export = run(
        &config(Publisher::Oup),
        &index,
        collaborators,
        &AtomicBool::new(false),
        &ProgressContext::hidden(),
    )
    .unwrap();

    let affs = export
        .table
        .header
        .iter()
        .position(|&c| c == Column::NonUniqueAffiliations)
        .unwrap();
    assert_eq!(export.table.rows[0][affs], MetricValue::Int(3));
}

#[test]
fn csv_file_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let index = Index::new(vec![article(1, "2024-10-02", "Hindawi")]);
    let files = files_for(&[1], APS_DOC);
    let repository = Repository::default();
    let collaborators = Collaborators {
        files: &files,
        repository: &repository,
    };
    let export = run(
        &config(Publisher::Hindawi),
        &index,
        collaborators,
        &AtomicBool::new(false),
        &ProgressContext::hidden(),
    )
    .unwrap();

    let path = dir.path().join("out/hindawi.csv");
    export.table.write_csv_file(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("year,journal,doi,"));
    assert_eq!(
        lines.next().unwrap(),
        "2024,Journal,10.1/1,2024-10-02,,,2,1,2,[],1,0"
    );
}
