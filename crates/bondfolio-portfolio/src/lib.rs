//! # Bondfolio Portfolio
//!
//! Valuation and coupon calendar projection for bond portfolios.
//!
//! The engine reads cached instrument snapshots through an injected
//! [`InstrumentStore`](bondfolio_traits::InstrumentStore) and turns them into
//! portfolio-level analytics.
//!
//! ## Pipeline
//!
//! 1. [`normalize`]: each record becomes a row with parsed dates and
//!    `<column>_delta` days-until columns
//! 2. [`valuation`]: full value in base currency and portfolio share
//! 3. [`aggregate`]: share-weighted YTM, yield, duration, coupon and
//!    maturity per face currency
//! 4. [`calendar`]: monthly coupon and principal flows through the longest
//!    maturity
//!
//! Data problems with single instruments never abort a run. They are
//! collected as [`Diagnostic`](diagnostics::Diagnostic)s on the report.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bondfolio_portfolio::prelude::*;
//!
//! let config = AnalyticsConfig::new(Date::today());
//! let engine = PortfolioEngine::new(&store, config);
//! let report = engine.run(&holdings)?;
//!
//! for metrics in &report.currency_metrics {
//!     println!("{}: YTM {:.2}%", metrics.currency, metrics.weighted_effective_yield);
//! }
//! for (month, amount) in report.calendar.iter() {
//!     println!("{month}: {amount:.0}");
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel`: Enable rayon-based parallel valuation, aggregation and
//!   calendar projection for large portfolios

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

// Module declarations
pub mod aggregate;
pub mod benchmark;
pub mod calendar;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fx;
pub mod normalize;
pub mod parallel;
pub mod refresh;
pub mod types;
pub mod valuation;

// Re-export error types at crate root
pub use error::{PortfolioError, PortfolioResult};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::aggregate::{aggregate_by_currency, CurrencyBucket, CurrencyMetrics};
    pub use crate::benchmark::{compare_all, compare_to_benchmark, BenchmarkComparison};
    pub use crate::calendar::{project_calendar, MonthlyCalendar};
    pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
    pub use crate::engine::{PortfolioEngine, PortfolioReport};
    pub use crate::error::{PortfolioError, PortfolioResult};
    pub use crate::fx::{FxResolution, FxTable};
    pub use crate::normalize::{NormalizeError, Normalized, Normalizer};
    pub use crate::refresh::{refresh_market_data, RefreshSummary};
    pub use crate::types::{AnalyticsConfig, EnrichedHolding, FxStatus, NormalizedInstrument};
    pub use crate::valuation::value_holdings;
    pub use bondfolio_core::types::{CurrencyCode, Date};
    pub use bondfolio_traits::{Holding, InstrumentId, InstrumentRecord};
}
