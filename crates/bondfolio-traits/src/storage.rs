//! Storage traits for the local instrument cache.
//!
//! The store is a best-effort cache of the latest instrument snapshots and
//! currency rates, keyed by ISIN and currency code respectively. It is split
//! into a read side used by the engine and a write side used by refresh.

use bondfolio_core::types::CurrencyCode;

use crate::error::TraitError;
use crate::ids::InstrumentId;
use crate::records::{CurrencyRate, InstrumentRecord};

/// Read access to cached instruments and currency rates.
pub trait InstrumentStore: Send + Sync {
    /// Returns the cached snapshot of an instrument.
    fn get_instrument(&self, id: &InstrumentId) -> Result<Option<InstrumentRecord>, TraitError>;

    /// Returns the cached rate of a currency in its quote currency.
    ///
    /// A currency never needs its own rate to be valued in itself; the
    /// engine reads the reporting currency's rate only to cross other
    /// currencies through a shared quote.
    fn get_currency_rate(&self, code: &CurrencyCode) -> Result<Option<CurrencyRate>, TraitError>;
}

/// Write access to cached instruments and currency rates.
pub trait InstrumentSink: Send + Sync {
    /// Inserts or replaces an instrument snapshot.
    fn put_instrument(&self, record: &InstrumentRecord) -> Result<(), TraitError>;

    /// Inserts or replaces currency rates.
    fn put_currency_rates(&self, rates: &[CurrencyRate]) -> Result<(), TraitError>;

    /// Removes every cached instrument. Returns the number removed.
    fn clear_instruments(&self) -> Result<usize, TraitError>;
}
