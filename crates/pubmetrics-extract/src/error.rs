//! Errors scoped to a single article

use pubmetrics_core::FetchError;

/// The document could not be read as well-formed XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedDocument {
    /// Byte offset where the reader gave up
    pub position: u64,
    pub message: String,
}

impl MalformedDocument {
    pub fn new(position: u64, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for MalformedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "malformed document at byte {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for MalformedDocument {}

/// Failure while producing one article's metrics row.
///
/// Malformed documents only cost that article; fetch errors have already been
/// retried when they reach this type and abort the run.
#[derive(Debug)]
pub enum ArticleError {
    Malformed {
        article_id: String,
        file: String,
        source: MalformedDocument,
    },
    Fetch {
        article_id: String,
        source: FetchError,
    },
}

impl ArticleError {
    /// Whether the run must stop rather than skip this article.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

impl std::fmt::Display for ArticleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed {
                article_id,
                file,
                source,
            } => write!(f, "article {article_id}: {file}: {source}"),
            Self::Fetch { article_id, source } => write!(f, "article {article_id}: {source}"),
        }
    }
}

impl std::error::Error for ArticleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed { source, .. } => Some(source),
            Self::Fetch { source, .. } => Some(source),
        }
    }
}
