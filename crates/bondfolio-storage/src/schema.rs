//! Versioned on-disk schema.
//!
//! Every stored value is an [`Envelope`] around the record itself:
//!
//! ```json
//! {"kind": "instrument", "schema_version": 1, "stored_at": "...", "data": {...}}
//! ```
//!
//! Reading a value written under another schema version fails with
//! [`StorageError::SchemaMismatch`] instead of guessing at its layout.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Schema version of stored instrument records.
pub const INSTRUMENT_SCHEMA_VERSION: u32 = 1;

/// Schema version of stored currency rates.
pub const CURRENCY_RATE_SCHEMA_VERSION: u32 = 2;

/// Kind of stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// [`InstrumentRecord`](bondfolio_traits::InstrumentRecord).
    Instrument,
    /// [`CurrencyRate`](bondfolio_traits::CurrencyRate).
    CurrencyRate,
}

impl RecordKind {
    /// Current schema version for this kind.
    #[must_use]
    pub const fn schema_version(self) -> u32 {
        match self {
            Self::Instrument => INSTRUMENT_SCHEMA_VERSION,
            Self::CurrencyRate => CURRENCY_RATE_SCHEMA_VERSION,
        }
    }

    /// Stable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instrument => "instrument",
            Self::CurrencyRate => "currency_rate",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored value with its kind, schema version and write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Record kind.
    pub kind: RecordKind,
    /// Schema version the data was written with.
    pub schema_version: u32,
    /// When the value was written.
    pub stored_at: DateTime<Utc>,
    /// The record.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wraps a record under the current schema version.
    pub fn new(kind: RecordKind, data: T) -> Self {
        Self {
            kind,
            schema_version: kind.schema_version(),
            stored_at: Utc::now(),
            data,
        }
    }

    /// Unwraps the record after checking kind and schema version.
    pub fn into_data(self, expected: RecordKind) -> StorageResult<T> {
        if self.kind != expected {
            return Err(StorageError::KindMismatch {
                expected,
                found: self.kind,
            });
        }
        if self.schema_version != expected.schema_version() {
            return Err(StorageError::SchemaMismatch {
                kind: expected,
                expected: expected.schema_version(),
                found: self.schema_version,
            });
        }
        Ok(self.data)
    }
}

/// Serializes a record inside an envelope.
pub(crate) fn encode<T: Serialize>(kind: RecordKind, data: &T) -> StorageResult<Vec<u8>> {
    Ok(serde_json::to_vec(&Envelope::new(kind, data))?)
}

/// Deserializes an envelope and returns its checked record.
pub(crate) fn decode<T: DeserializeOwned>(kind: RecordKind, bytes: &[u8]) -> StorageResult<T> {
    let envelope: Envelope<T> = serde_json::from_slice(bytes)?;
    envelope.into_data(kind)
}
