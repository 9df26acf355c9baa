//! A holding joined with its instrument and valuation.

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::InstrumentId;
use serde::Serialize;

use super::NormalizedInstrument;

/// How a holding's FX rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FxStatus {
    /// Face currency is the base currency; rate is 1.0.
    Base,
    /// Rate found in the store.
    Resolved,
    /// No usable rate; valued at zero.
    Unresolved,
}

impl FxStatus {
    /// Returns true if the rate is usable.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// A position with its instrument data and derived values.
///
/// Built once per run by [`value_holdings`](crate::valuation::value_holdings)
/// and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedHolding {
    /// Instrument data.
    pub instrument: NormalizedInstrument,
    /// Number of lots held.
    pub lot_count: i64,
    /// Face currency to base currency rate. Zero when unresolved.
    pub fx_rate_to_base: f64,
    /// Where the rate came from.
    pub fx_status: FxStatus,
    /// Market value plus accrued coupon, in base currency.
    pub full_value_base: f64,
    /// Fraction of the portfolio's total full value.
    pub portfolio_share: f64,
}

impl EnrichedHolding {
    /// Instrument identifier.
    #[must_use]
    pub fn id(&self) -> &InstrumentId {
        &self.instrument.instrument_id
    }

    /// Face currency.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.instrument.face_currency
    }

    /// Days from the valuation date to the next coupon.
    #[must_use]
    pub fn days_to_next_coupon(&self) -> i64 {
        self.instrument.days_to_next_coupon
    }

    /// Days from the valuation date to maturity.
    #[must_use]
    pub fn days_to_maturity(&self) -> i64 {
        self.instrument.days_to_maturity
    }
}
