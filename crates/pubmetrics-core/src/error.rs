//! Error type shared by all collaborator boundaries (index, object store, repository)

use std::time::Duration;

/// Error from talking to an external collaborator.
///
/// Article cursors, file stores and the repository store all report this
/// type, so the retry loop can classify failures without knowing the backend.
#[derive(Debug)]
pub enum FetchError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Local or network I/O error
    Io(std::io::Error),
    /// No response within the configured timeout
    Timeout(Duration),
    /// Backend answered, but with content we cannot use (bad JSON record, etc.)
    Invalid(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Timeout(d) => write!(f, "timed out after {:.1}s", d.as_secs_f64()),
            Self::Invalid(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl FetchError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Http {
                status: None,
                message: format!("request timed out: {e}"),
            };
        }
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            // 4xx are caller errors except request timeout and rate limiting
            Self::Http {
                status: Some(s), ..
            } if (400..500).contains(s) => matches!(s, 408 | 429),
            Self::Http { .. } => true,
            Self::Io(e) => !matches!(
                e.kind(),
                std::io::ErrorKind::NotFound
                    | std::io::ErrorKind::PermissionDenied
                    | std::io::ErrorKind::StorageFull
                    | std::io::ErrorKind::InvalidData
            ),
            Self::Timeout(_) => true,
            Self::Invalid(_) => false,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
