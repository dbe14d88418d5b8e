//! Error types for ep-core

use thiserror::Error;

/// Main error type for ep-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for ep-core
pub type Result<T> = std::result::Result<T, Error>;
