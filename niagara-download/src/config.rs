use std::time::Duration;

use niagara_progress::ProgressConfig;
use serde::{Deserialize, Serialize};

use crate::error::{DownloadError, Result};

/// Configuration for a download batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Maximum concurrent fetches
    pub max_workers: usize,
    /// Payloads smaller than this many bytes count as empty
    pub min_content_size: u64,
    /// Pause before each fetch in milliseconds, scaled up while the
    /// station keeps failing
    pub throttle_delay_ms: u64,
    /// Console progress line
    pub progress: ProgressConfig,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_workers: 10,
            min_content_size: 50,
            throttle_delay_ms: 0,
            progress: ProgressConfig::default(),
        }
    }
}

impl DownloadConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the progress line disabled when `NO_PROGRESS` is set
    pub fn from_env() -> Self {
        Self::default().with_progress(ProgressConfig::from_env())
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the runner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(DownloadError::config_error("max_workers must be at least 1"));
        }
        if self.progress.bar_width == 0 {
            return Err(DownloadError::config_error("progress.bar_width must be at least 1"));
        }
        Ok(())
    }

    /// Set maximum concurrent fetches
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = max.max(1);
        self
    }

    /// Set the empty-payload threshold
    pub fn with_min_content_size(mut self, bytes: u64) -> Self {
        self.min_content_size = bytes;
        self
    }

    /// Set the base pause before each fetch
    pub fn with_throttle_delay(mut self, delay: Duration) -> Self {
        self.throttle_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the progress line configuration
    pub fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    pub fn throttle_delay(&self) -> Duration {
        Duration::from_millis(self.throttle_delay_ms)
    }
}
