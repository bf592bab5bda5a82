//! Article file stores: a local directory tree or an HTTP base URL

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pubmetrics_core::{FetchError, fetch_bytes, join_url};
use pubmetrics_extract::FileStore;

/// Files under `root`, keyed by their `/`-separated path relative to it.
///
/// The key list is built once and sorted, so "first record containing the
/// suffix" is deterministic.
pub struct DirFileStore {
    root: PathBuf,
    keys: Vec<String>,
}

impl DirFileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        anyhow::ensure!(root.is_dir(), "{} is not a directory", root.display());

        let pattern = root.join("**").join("*");
        let pattern_str = pattern.to_string_lossy();
        let mut keys: Vec<String> = glob::glob(&pattern_str)
            .context("invalid glob pattern")?
            .filter_map(|e| e.ok())
            .filter(|p| p.is_file())
            .filter_map(|p| relative_key(&root, &p))
            .collect();
        keys.sort();

        log::debug!("{}: {} stored files", root.display(), keys.len());
        Ok(Self { root, keys })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

impl FileStore for DirFileStore {
    fn fetch(&self, suffix: &str) -> Result<Option<Vec<u8>>, FetchError> {
        let Some(key) = self.keys.iter().find(|k| k.contains(suffix)) else {
            return Ok(None);
        };
        Ok(Some(std::fs::read(self.root.join(key))?))
    }
}

/// `GET <base_url>/<suffix>`; 404 means no record.
pub struct HttpFileStore {
    base_url: String,
    timeout: Duration,
}

impl HttpFileStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl FileStore for HttpFileStore {
    fn fetch(&self, suffix: &str) -> Result<Option<Vec<u8>>, FetchError> {
        fetch_bytes(&join_url(&self.base_url, suffix), self.timeout)
    }
}

/// HTTP store for `http(s)://` locations, directory store otherwise.
pub fn open_file_store(location: &str, timeout: Duration) -> Result<Box<dyn FileStore>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        log::info!("Reading article files from {location}");
        return Ok(Box::new(HttpFileStore::new(location, timeout)));
    }
    let store = DirFileStore::open(location)
        .with_context(|| format!("Failed to index article files in {location}"))?;
    log::info!("Indexed {} article files in {location}", store.len());
    Ok(Box::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (key, body) in [
            ("b/files/7/7.xml", "second"),
            ("a/files/7/7.xml", "first"),
            ("a/files/8/8.pdf", "pdf"),
        ] {
            let path = dir.path().join(key);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
        dir
    }

    #[test]
    fn first_record_containing_suffix_wins() {
        let dir = tree();
        let store = DirFileStore::open(dir.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.fetch("files/7/7.xml").unwrap(),
            Some(b"first".to_vec())
        );
    }

    #[test]
    fn unmatched_suffix_is_none() {
        let dir = tree();
        let store = DirFileStore::open(dir.path()).unwrap();
        assert_eq!(store.fetch("files/9/9.xml").unwrap(), None);
    }

    #[test]
    fn directory_is_required() {
        assert!(DirFileStore::open("/nonexistent/pubmetrics/files").is_err());
    }

    #[test]
    fn location_picks_the_backend() {
        let dir = tree();
        let location = dir.path().to_string_lossy().into_owned();
        assert!(open_file_store(&location, Duration::from_secs(1)).is_ok());
        assert!(open_file_store("https://files.example.org/", Duration::from_secs(1)).is_ok());
    }
}
