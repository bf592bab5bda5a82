//! Repository author/affiliation rows from a JSON document

use std::path::Path;

use anyhow::{Context, Result};
use pubmetrics_core::FetchError;
use pubmetrics_extract::RepositoryAffiliations;
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// `{"authors": {article_id: [author_id, ...]}, "affiliations": {author_id: count}}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JsonRepository {
    authors: FxHashMap<String, Vec<String>>,
    affiliations: FxHashMap<String, usize>,
}

impl JsonRepository {
    /// Load `path`; no path or a missing file gives an empty store.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            log::warn!(
                "Repository file {} not found, repository counts will be 0",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let repository: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::info!(
            "Loaded {} articles and {} authors from {}",
            repository.authors.len(),
            repository.affiliations.len(),
            path.display()
        );
        Ok(repository)
    }
}

impl RepositoryAffiliations for JsonRepository {
    fn author_ids(&self, article_id: &str) -> Result<Vec<String>, FetchError> {
        Ok(self.authors.get(article_id).cloned().unwrap_or_default())
    }

    fn affiliation_count(&self, author_id: &str) -> Result<usize, FetchError> {
        Ok(self.affiliations.get(author_id).copied().unwrap_or(0))
    }
}
