//! Error types for TestPulse

use thiserror::Error;

/// Result type alias using TestPulse Error
pub type Result<T> = std::result::Result<T, Error>;

/// TestPulse error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Watch error: {0}")]
    Watch(String),
}

impl Error {
    /// Shorthand for a NotFound error
    pub fn not_found(kind: &str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.to_string(),
            id: id.into(),
        }
    }
}
