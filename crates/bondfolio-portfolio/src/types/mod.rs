//! Domain types for a portfolio run.
//!
//! - [`AnalyticsConfig`]: Configuration for a run
//! - [`NormalizedInstrument`]: Typed instrument fields extracted from a row
//! - [`EnrichedHolding`]: Holding plus instrument, FX and valuation
//! - [`FxStatus`]: How a holding's FX rate was obtained

mod config;
mod holding;
mod instrument;

pub use config::AnalyticsConfig;
pub use holding::{EnrichedHolding, FxStatus};
pub use instrument::{FieldError, NormalizedInstrument};
