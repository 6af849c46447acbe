//! Error types for gz-core

use thiserror::Error;

/// Main error type for gz-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Completion API error: {0}")]
    Api(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gz-core
pub type Result<T> = std::result::Result<T, Error>;
