//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pubmetrics_core::RetryPolicy;
use serde::Deserialize;

/// Global configuration for pubmetrics
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub export: ExportSection,
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub workers: usize,
    pub batch_size: usize,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            workers: pubmetrics_extract::config::default_workers().min(8),
            batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub fetch_timeout: u64,
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further attempt
    pub backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: 60,
            max_retries: 3,
            backoff_ms: 2_000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.backoff_ms),
            ..RetryPolicy::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Marker before the stored file key in related file paths
    pub marker: String,
    /// Local directory or http(s) base URL holding the article files
    pub files: Option<String>,
    /// JSON file with the repository author/affiliation rows
    pub repository: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            marker: pubmetrics_extract::DEFAULT_STORAGE_MARKER.to_string(),
            files: None,
            repository: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./reports"),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./pubmetrics.toml (current directory)
    /// 2. ~/.config/pubmetrics/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("pubmetrics.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "pubmetrics") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
