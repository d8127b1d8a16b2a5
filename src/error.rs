//! Error handling for cookie-master

use thiserror::Error;

/// Main error type for cookie-master operations
#[derive(Error, Debug)]
pub enum CookieMasterError {
    /// The host cookie or storage API refused the request.
    #[error("Host rejected the request: {0}")]
    Rejected(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported page scheme: {0}")]
    UnsupportedScheme(String),

    #[error("No active tab")]
    NoActiveTab,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for cookie-master operations
pub type Result<T> = std::result::Result<T, CookieMasterError>;
