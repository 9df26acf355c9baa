//! Storage error types.

use bondfolio_traits::TraitError;
use thiserror::Error;

use crate::schema::RecordKind;

/// Storage operation result type.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error types.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from the underlying storage engine.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Stored value written under another schema.
    #[error("Schema mismatch for {kind}: expected version {expected}, found {found}")]
    SchemaMismatch {
        /// Record kind read.
        kind: RecordKind,
        /// Version this build understands.
        expected: u32,
        /// Version found in the stored envelope.
        found: u32,
    },

    /// Stored value is a different kind of record.
    #[error("Record kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// Kind requested.
        expected: RecordKind,
        /// Kind found in the stored envelope.
        found: RecordKind,
    },

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redb::Error> for StorageError {
    fn from(err: redb::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<redb::DatabaseError> for StorageError {
    fn from(err: redb::DatabaseError) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<redb::TableError> for StorageError {
    fn from(err: redb::TableError) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<redb::TransactionError> for StorageError {
    fn from(err: redb::TransactionError) -> Self {
        StorageError::Transaction(err.to_string())
    }
}

impl From<redb::CommitError> for StorageError {
    fn from(err: redb::CommitError) -> Self {
        StorageError::Transaction(err.to_string())
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(err: redb::StorageError) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            StorageError::Deserialization(err.to_string())
        } else {
            StorageError::Serialization(err.to_string())
        }
    }
}

impl From<StorageError> for TraitError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(e) => TraitError::IoError(e.to_string()),
            StorageError::Serialization(msg) | StorageError::Deserialization(msg) => {
                TraitError::SerializationError(msg)
            }
            other => TraitError::DatabaseError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_display() {
        let err = StorageError::SchemaMismatch {
            kind: RecordKind::Instrument,
            expected: 1,
            found: 7,
        };
        assert_eq!(
            err.to_string(),
            "Schema mismatch for instrument: expected version 1, found 7"
        );
    }

    #[test]
    fn test_into_trait_error() {
        let err: TraitError = StorageError::Database("locked".into()).into();
        assert!(matches!(err, TraitError::DatabaseError(_)));

        let err: TraitError = StorageError::Deserialization("bad json".into()).into();
        assert!(matches!(err, TraitError::SerializationError(_)));
    }
}
