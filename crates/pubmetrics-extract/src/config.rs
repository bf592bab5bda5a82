//! Export run configuration

use pubmetrics_core::RetryPolicy;

use crate::publisher::Publisher;
use crate::source::{DEFAULT_STORAGE_MARKER, DateRange};

/// Runtime configuration for one export
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Publisher whose articles are exported
    pub publisher: Publisher,
    /// Inclusive publication date bounds
    pub range: DateRange,
    /// Worker threads for the per-article pipeline
    pub workers: usize,
    /// Articles pulled from the cursor per parallel batch
    pub batch_size: usize,
    /// Retry policy for collaborator calls
    pub retry: RetryPolicy,
    /// Marker before the stored file key in related file paths
    pub storage_marker: String,
}

impl ExportConfig {
    pub fn new(publisher: Publisher) -> Self {
        Self {
            publisher,
            range: DateRange::default(),
            workers: default_workers(),
            batch_size: 64,
            retry: RetryPolicy::default(),
            storage_marker: DEFAULT_STORAGE_MARKER.to_string(),
        }
    }
}

/// Available parallelism, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}
