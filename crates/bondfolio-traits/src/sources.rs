//! Source traits for data coming into the engine.
//!
//! - [`MarketDataSource`]: fetches instrument snapshots and currency rates
//! - [`PortfolioSource`]: loads the user's holdings
//! - [`BenchmarkCurveSource`]: supplies risk-free curves per currency
//!
//! Sources are synchronous. Retries and back-off, if any, happen inside the
//! implementation; the engine sees the final outcome only.

use std::path::Path;

use bondfolio_core::types::CurrencyCode;

use crate::curves::BenchmarkCurve;
use crate::error::TraitError;
use crate::ids::InstrumentId;
use crate::records::{CurrencyRate, Holding, InstrumentRecord};

/// Market data provider.
pub trait MarketDataSource: Send + Sync {
    /// Fetches the latest snapshot of an instrument.
    ///
    /// `Ok(None)` means the provider does not know the instrument.
    fn fetch_instrument(&self, id: &InstrumentId) -> Result<Option<InstrumentRecord>, TraitError>;

    /// Fetches the latest published rate of every currency, each with its
    /// quote currency and fixing date when known.
    fn fetch_currency_rates(&self) -> Result<Vec<CurrencyRate>, TraitError>;
}

/// Portfolio file reader.
pub trait PortfolioSource: Send + Sync {
    /// Loads holdings from `path`.
    ///
    /// Fails with [`TraitError::Format`] if the source does not have exactly
    /// two columns (identifier, lot count) or a lot count is not integral.
    fn load_portfolio(&self, path: &Path) -> Result<Vec<Holding>, TraitError>;
}

/// Benchmark curve provider.
pub trait BenchmarkCurveSource: Send + Sync {
    /// Returns the curve for a currency, if one is available.
    fn benchmark_curve(&self, currency: &CurrencyCode)
        -> Result<Option<BenchmarkCurve>, TraitError>;
}
