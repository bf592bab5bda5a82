//! Article index backed by a JSON Lines file, optionally gzipped

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use pubmetrics_core::FetchError;
use pubmetrics_extract::{ArticleCursor, ArticleRecord, ArticleSource, DateRange};

/// One article document per line. Files ending in `.gz` are decompressed on
/// the fly.
pub struct JsonlArticleSource {
    path: PathBuf,
}

impl JsonlArticleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<BufReader<Box<dyn Read + Send>>, FetchError> {
        let file = File::open(&self.path)?;
        let reader: Box<dyn Read + Send> = if is_gzip(&self.path) {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

impl ArticleSource for JsonlArticleSource {
    fn articles(&self, range: &DateRange) -> Result<ArticleCursor<'_>, FetchError> {
        let range = *range;
        let path = self.path.display().to_string();
        let lines = self.open()?.lines().enumerate();

        let cursor = lines.filter_map(move |(n, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(FetchError::Io(e))),
            };
            if line.trim().is_empty() {
                return None;
            }
            match serde_json::from_str::<ArticleRecord>(&line) {
                Ok(article) if range.contains(article.publication_date) => Some(Ok(article)),
                Ok(_) => None,
                Err(e) => Some(Err(FetchError::Invalid(format!(
                    "{path}:{}: {e}",
                    n + 1
                )))),
            }
        });
        Ok(Box::new(cursor))
    }
}
