//! HTTP byte fetch with a per-request timeout.
//!
//! Uses async reqwest internally with tokio::time::timeout, but presents a
//! sync interface for compatibility with rayon workers.

use std::sync::LazyLock;
use std::time::Duration;

use crate::error::FetchError;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(8)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HTTP GET the whole body of `url`.
///
/// Returns `Ok(None)` for 404 so callers can treat a missing object like an
/// unresolved file record. The whole exchange (headers and body) must finish
/// within `timeout`.
pub fn fetch_bytes(url: &str, timeout: Duration) -> Result<Option<Vec<u8>>, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let request = async {
            let response = SHARED_CLIENT
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }

            let body = response
                .error_for_status()
                .map_err(|e| FetchError::from_reqwest(&e))?
                .bytes()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))?;
            Ok(Some(body.to_vec()))
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    })
}

/// Join a base URL and a relative object key with exactly one slash.
pub fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
