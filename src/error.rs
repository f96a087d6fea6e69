use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Server error: status={status}, message={message}")]
    Server { status: u16, message: String },

    #[error("Unexpected server response: {0}")]
    UnexpectedResponse(String),

    #[error("Polling timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for BatchError {
    fn from(e: toml::de::Error) -> Self {
        BatchError::Config(e.to_string())
    }
}

pub type BatchResult<T> = Result<T, BatchError>;
