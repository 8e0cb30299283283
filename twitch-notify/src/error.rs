//! Application-wide error types.

use stream_status_parser::ExtractorError;
use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// The platform reported that the stream does not exist.
    #[error("Invalid stream name: {0}")]
    StreamNotFound(String),

    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    /// Whether the error means a stream identifier is unusable.
    pub fn is_stream_not_found(&self) -> bool {
        matches!(self, Self::StreamNotFound(_))
    }
}
