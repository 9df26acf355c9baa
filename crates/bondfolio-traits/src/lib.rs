//! # Bondfolio Traits
//!
//! Trait definitions and record types shared between the Bondfolio engine
//! and its collaborators.
//!
//! This crate contains ONLY definitions. Implementations live in
//! `bondfolio-storage` (persistence) and `bondfolio-ext-file` (files and
//! saved exchange documents).
//!
//! ## Module Structure
//!
//! - [`records`]: Raw instrument records, holdings and currency rates
//! - [`curves`]: Benchmark (risk-free) yield curves
//! - [`sources`]: Market data, portfolio and benchmark curve sources
//! - [`storage`]: Read and write sides of the instrument store
//!
//! ## Dependency Injection
//!
//! The engine takes its collaborators as explicit handles:
//!
//! ```ignore
//! let store = RedbStorage::open("bonds.redb")?;
//! let engine = PortfolioEngine::new(&store, AnalyticsConfig::new(today));
//! let report = engine.run(&holdings)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod curves;
pub mod error;
pub mod ids;
pub mod records;
pub mod sources;
pub mod storage;

// Re-export commonly used types
pub use curves::{BenchmarkCurve, CurvePoint};
pub use error::TraitError;
pub use ids::InstrumentId;
pub use records::{CurrencyRate, Holding, InstrumentRecord};
pub use sources::{BenchmarkCurveSource, MarketDataSource, PortfolioSource};
pub use storage::{InstrumentSink, InstrumentStore};
