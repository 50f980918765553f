//! Error types for querymuse-core

use thiserror::Error;

/// Main error type for the querymuse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Response generation failed (the single modeled domain failure)
    #[error("response generation failed: {0}")]
    ResponseGeneration(String),

    /// Bookmark not found
    #[error("bookmark not found: {0}")]
    BookmarkNotFound(String),

    /// History entry not found
    #[error("history entry not found: {0}")]
    HistoryNotFound(String),
}

/// Result type alias for querymuse-core
pub type Result<T> = std::result::Result<T, Error>;
