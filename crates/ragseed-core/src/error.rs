//! Error types for ragseed

use thiserror::Error;

/// Result type alias using RagseedError
pub type Result<T> = std::result::Result<T, RagseedError>;

/// Error type alias for convenience
pub type Error = RagseedError;

/// Main error type for ragseed
#[derive(Debug, Error)]
pub enum RagseedError {
    /// Invalid construction-time settings (e.g. streaming requested).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or a response body that is not JSON.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint returned a structured error payload. The message is
    /// the payload's `error` field, verbatim.
    #[error("{0}")]
    Provider(String),

    /// The endpoint returned zero choices.
    #[error("No valid response from the model")]
    EmptyResponse,

    /// Context-size lookup for an unrecognized model identifier.
    #[error("{0}")]
    UnknownModel(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}
