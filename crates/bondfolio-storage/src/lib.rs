//! Bondfolio Storage Layer
//!
//! Persistence for the instrument cache: the latest market snapshot of each
//! instrument, keyed by ISIN, and the latest rate of each currency against
//! the base currency.
//!
//! # Features
//!
//! - **Instrument Cache**: Latest exchange snapshot per instrument
//! - **Currency Rates**: Latest fixing per currency
//! - **Versioned Schema**: Every stored value carries its record kind and
//!   schema version, checked on read
//! - **Multiple Backends**: redb (default) and in-memory adapters
//!
//! Both backends implement the engine-facing
//! [`InstrumentStore`](bondfolio_traits::InstrumentStore) and
//! [`InstrumentSink`](bondfolio_traits::InstrumentSink) traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use bondfolio_storage::{RedbStorage, StorageAdapter};
//!
//! let storage = RedbStorage::open("./bonds.redb")?;
//! storage.store_instrument(&record)?;
//! let cached = storage.read_instrument("RU000A0JX0J2")?;
//! ```
//!
//! # Storage Backends
//!
//! ## RedbStorage (Default)
//!
//! Uses [redb](https://crates.io/crates/redb), a pure-Rust embedded database
//! with ACID transactions. Suitable for single-process applications.
//!
//! ## InMemoryStorage
//!
//! A simple in-memory implementation for testing and development.
//! Data is not persisted across restarts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod adapter;
mod bridge;
mod error;
mod memory;
mod redb;
mod schema;

// Re-export core types
pub use adapter::{StorageAdapter, StorageStats};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStorage;
pub use redb::RedbStorage;
pub use schema::{
    Envelope, RecordKind, CURRENCY_RATE_SCHEMA_VERSION, INSTRUMENT_SCHEMA_VERSION,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adapter::{StorageAdapter, StorageStats};
    pub use crate::error::{StorageError, StorageResult};
    pub use crate::memory::InMemoryStorage;
    pub use crate::redb::RedbStorage;
    pub use crate::schema::RecordKind;
}
