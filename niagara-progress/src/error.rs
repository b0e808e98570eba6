use thiserror::Error;

/// Errors raised by the progress reporter when it is driven incorrectly.
///
/// Console failures are never surfaced through this type; a failed render is
/// skipped silently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    /// An argument was outside its accepted range
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A method was called in the wrong lifecycle state
    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

impl ProgressError {
    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new invalid state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}

/// Type alias for Results using ProgressError
pub type Result<T> = std::result::Result<T, ProgressError>;
