//! Storage adapter trait definition.

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::{CurrencyRate, InstrumentRecord};

use crate::error::StorageResult;

/// Storage adapter trait for the instrument cache.
///
/// Implementations must be thread-safe (`Send + Sync`). Every write replaces
/// whatever was stored under the same key.
pub trait StorageAdapter: Send + Sync {
    // =========================================================================
    // Instrument Operations
    // =========================================================================

    /// Stores an instrument snapshot, replacing any previous one.
    fn store_instrument(&self, record: &InstrumentRecord) -> StorageResult<()>;

    /// Reads the snapshot cached under an ISIN.
    fn read_instrument(&self, isin: &str) -> StorageResult<Option<InstrumentRecord>>;

    /// Deletes one instrument. Returns `true` if it existed.
    fn delete_instrument(&self, isin: &str) -> StorageResult<bool>;

    /// Lists cached ISINs in key order.
    fn list_instruments(&self) -> StorageResult<Vec<String>>;

    /// Removes every cached instrument. Returns the number removed.
    fn purge_instruments(&self) -> StorageResult<usize>;

    // =========================================================================
    // Currency Rate Operations
    // =========================================================================

    /// Stores a batch of rates in a single write.
    fn store_currency_rates(&self, rates: &[CurrencyRate]) -> StorageResult<()>;

    /// Reads the cached rate of a currency.
    fn read_currency_rate(&self, code: &CurrencyCode) -> StorageResult<Option<CurrencyRate>>;

    /// Lists every cached rate ordered by currency code.
    fn list_currency_rates(&self) -> StorageResult<Vec<CurrencyRate>>;

    // =========================================================================
    // Utility Operations
    // =========================================================================

    /// Get storage statistics.
    fn stats(&self) -> StorageResult<StorageStats>;

    /// Returns the backend name.
    fn backend_name(&self) -> &'static str;

    /// Checks if the storage is healthy.
    fn is_healthy(&self) -> bool;
}

/// Storage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of cached instruments.
    pub instrument_count: usize,
    /// Number of cached currency rates.
    pub currency_rate_count: usize,
    /// Size of the backing file, for file-backed stores.
    pub file_size_bytes: Option<u64>,
}
