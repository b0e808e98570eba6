use niagara_progress::ProgressError;
use thiserror::Error;

/// Errors that can occur while running a download batch
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Progress reporter was driven out of sequence
    #[error("Progress reporting error: {0}")]
    ProgressError(#[from] ProgressError),

    /// A worker task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    /// JSON encoding or decoding failed
    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl DownloadError {
    /// Create a new configuration error
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

/// Type alias for Results using DownloadError
pub type Result<T> = std::result::Result<T, DownloadError>;
