//! Error handling for jarcat

use thiserror::Error;

/// Main error type for jarcat operations
#[derive(Error, Debug)]
pub enum JarcatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cookie store error: {0}")]
    Store(String),

    #[error("Collector rejected payload: {0}")]
    Collector(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type alias for jarcat operations
pub type Result<T> = std::result::Result<T, JarcatError>;
