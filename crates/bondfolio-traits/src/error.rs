//! Error types for trait operations.

use thiserror::Error;

/// Common error type for collaborator operations.
#[derive(Debug, Error)]
pub enum TraitError {
    /// Malformed portfolio or curve source.
    #[error("format error: {0}")]
    Format(String),

    /// Requested resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Source not available
    #[error("source not available: {0}")]
    SourceNotAvailable(String),

    /// Parse/deserialization error
    #[error("parse error: {0}")]
    ParseError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Database error
    #[error("database error: {0}")]
    DatabaseError(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TraitError {
    /// Returns true for [`TraitError::Format`].
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

impl From<std::io::Error> for TraitError {
    fn from(e: std::io::Error) -> Self {
        TraitError::IoError(e.to_string())
    }
}

impl From<serde_json::Error> for TraitError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            TraitError::IoError(e.to_string())
        } else {
            TraitError::ParseError(e.to_string())
        }
    }
}

impl From<bondfolio_core::error::CoreError> for TraitError {
    fn from(e: bondfolio_core::error::CoreError) -> Self {
        TraitError::InvalidInput(e.to_string())
    }
}
