//! Per-article pipeline: fetch the document, dispatch, aggregate

use pubmetrics_core::{FetchError, retry_with_backoff};

use crate::article::ArticleRecord;
use crate::config::ExportConfig;
use crate::dispatch::dispatch;
use crate::error::ArticleError;
use crate::metrics::{MetricsRecord, aggregate};
use crate::model::Extraction;
use crate::publisher::AffiliationSource;
use crate::source::{FileStore, RepositoryAffiliations, storage_suffix};

/// Storage and repository collaborators shared by all workers.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub files: &'a dyn FileStore,
    pub repository: &'a dyn RepositoryAffiliations,
}

/// Build one article's metrics row.
///
/// A malformed document only fails this article; collaborator errors have
/// exhausted their retries by the time they are returned.
pub fn process_article(
    article: &ArticleRecord,
    config: &ExportConfig,
    collaborators: Collaborators<'_>,
) -> Result<MetricsRecord, ArticleError> {
    let publisher = &config.publisher;
    let Some(schema) = publisher.schema() else {
        return Ok(aggregate(article, publisher, &Extraction::default(), 0));
    };

    let extraction = match fetch_document(article, config, collaborators.files)? {
        Some((file, document)) => {
            dispatch(publisher, &document).map_err(|source| ArticleError::Malformed {
                article_id: article.id.clone(),
                file: file.to_string(),
                source,
            })?
        }
        None => {
            log::debug!("article {}: no stored XML file", article.id);
            Extraction::default()
        }
    };

    let repository_count = match schema.affiliations {
        AffiliationSource::Repository => {
            let label = format!("repository affiliations of article {}", article.id);
            retry_with_backoff(&label, &config.retry, || {
                collaborators
                    .repository
                    .article_affiliation_count(&article.id)
            })
            .map_err(|source| fetch_error(article, source))?
        }
        AffiliationSource::Xml => 0,
    };

    Ok(aggregate(article, publisher, &extraction, repository_count))
}

/// The first XML related file the store resolves, with its path.
fn fetch_document<'a>(
    article: &'a ArticleRecord,
    config: &ExportConfig,
    files: &dyn FileStore,
) -> Result<Option<(&'a str, Vec<u8>)>, ArticleError> {
    for path in article.xml_files() {
        let suffix = storage_suffix(path, &config.storage_marker);
        let label = format!("fetch {suffix}");
        let fetched = retry_with_backoff(&label, &config.retry, || files.fetch(suffix))
            .map_err(|source| fetch_error(article, source))?;
        if let Some(bytes) = fetched {
            return Ok(Some((path, bytes)));
        }
        log::debug!("article {}: {suffix} not in storage", article.id);
    }
    Ok(None)
}

fn fetch_error(article: &ArticleRecord, source: FetchError) -> ArticleError {
    ArticleError::Fetch {
        article_id: article.id.clone(),
        source,
    }
}
