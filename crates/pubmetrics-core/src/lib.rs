//! Pubmetrics Core - shared infrastructure for the metrics export
//!
//! Logging, progress, cancellation, and the fetch/retry plumbing used at every
//! collaborator boundary (article index, object store, repository store).

pub mod error;
pub mod fetch;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod shutdown;

// Re-exports for convenience
pub use error::FetchError;
pub use fetch::{SHARED_RUNTIME, fetch_bytes, join_url};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use shutdown::shutdown_flag;
