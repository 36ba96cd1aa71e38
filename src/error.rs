//! Error types for the CSV uploader.

use thiserror::Error;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connect, DNS, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a body that does not match the expected JSON shape
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// No answer within the allotted time
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value could not be parsed
    #[error("configuration error for {key}: {message}")]
    Config { key: String, message: String },

    /// Submit was requested without an accepted file
    #[error("no file selected")]
    NoFileSelected,

    /// The controller runtime could not be started or has stopped
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    /// True for failures that happened before any HTTP response was decoded.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Decode(_) | Error::Timeout(_) | Error::Io(_)
        )
    }
}
