//! In-memory storage implementation for testing and development.

use std::collections::BTreeMap;
use std::sync::RwLock;

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::{CurrencyRate, InstrumentRecord};

use crate::adapter::{StorageAdapter, StorageStats};
use crate::error::{StorageError, StorageResult};

/// In-memory storage for testing and development.
///
/// Data is not persisted across restarts.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    instruments: RwLock<BTreeMap<String, InstrumentRecord>>,
    currency_rates: RwLock<BTreeMap<CurrencyCode, CurrencyRate>>,
}

fn lock_error<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Database(format!("Lock error: {}", e))
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for InMemoryStorage {
    fn store_instrument(&self, record: &InstrumentRecord) -> StorageResult<()> {
        let mut instruments = self.instruments.write().map_err(lock_error)?;
        instruments.insert(record.instrument_id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn read_instrument(&self, isin: &str) -> StorageResult<Option<InstrumentRecord>> {
        let instruments = self.instruments.read().map_err(lock_error)?;
        Ok(instruments.get(isin).cloned())
    }

    fn delete_instrument(&self, isin: &str) -> StorageResult<bool> {
        let mut instruments = self.instruments.write().map_err(lock_error)?;
        Ok(instruments.remove(isin).is_some())
    }

    fn list_instruments(&self) -> StorageResult<Vec<String>> {
        let instruments = self.instruments.read().map_err(lock_error)?;
        Ok(instruments.keys().cloned().collect())
    }

    fn purge_instruments(&self) -> StorageResult<usize> {
        let mut instruments = self.instruments.write().map_err(lock_error)?;
        let removed = instruments.len();
        instruments.clear();
        Ok(removed)
    }

    fn store_currency_rates(&self, rates: &[CurrencyRate]) -> StorageResult<()> {
        let mut stored = self.currency_rates.write().map_err(lock_error)?;
        for rate in rates {
            stored.insert(rate.currency, rate.clone());
        }
        Ok(())
    }

    fn read_currency_rate(&self, code: &CurrencyCode) -> StorageResult<Option<CurrencyRate>> {
        let rates = self.currency_rates.read().map_err(lock_error)?;
        Ok(rates.get(code).cloned())
    }

    fn list_currency_rates(&self) -> StorageResult<Vec<CurrencyRate>> {
        let rates = self.currency_rates.read().map_err(lock_error)?;
        Ok(rates.values().cloned().collect())
    }

    fn stats(&self) -> StorageResult<StorageStats> {
        let instruments = self.instruments.read().map_err(lock_error)?;
        let rates = self.currency_rates.read().map_err(lock_error)?;
        Ok(StorageStats {
            instrument_count: instruments.len(),
            currency_rate_count: rates.len(),
            file_size_bytes: None,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondfolio_traits::{InstrumentId, InstrumentSink, InstrumentStore};

    #[test]
    fn test_instrument_replace() {
        let storage = InMemoryStorage::new();
        let mut record = InstrumentRecord::new("RU000A0JX0J2");
        record.last_price = Some(98.0);
        storage.store_instrument(&record).unwrap();

        record.last_price = Some(99.5);
        storage.store_instrument(&record).unwrap();

        let cached = storage.read_instrument("RU000A0JX0J2").unwrap().unwrap();
        assert_eq!(cached.last_price, Some(99.5));
        assert_eq!(storage.list_instruments().unwrap().len(), 1);
    }

    #[test]
    fn test_purge_keeps_rates() {
        let storage = InMemoryStorage::new();
        storage.store_instrument(&InstrumentRecord::new("A")).unwrap();
        storage.store_instrument(&InstrumentRecord::new("B")).unwrap();
        storage
            .store_currency_rates(&[CurrencyRate::new(CurrencyCode::USD, CurrencyCode::RUB, 92.0)])
            .unwrap();

        assert_eq!(storage.clear_instruments().unwrap(), 2);

        let stats = storage.stats().unwrap();
        assert_eq!(stats.instrument_count, 0);
        assert_eq!(stats.currency_rate_count, 1);
    }

    #[test]
    fn test_store_traits() {
        let storage = InMemoryStorage::new();
        storage
            .put_instrument(&InstrumentRecord::new("RU000A105SG2"))
            .unwrap();
        storage
            .put_currency_rates(&[CurrencyRate::new(CurrencyCode::CNY, CurrencyCode::RUB, 12.6)])
            .unwrap();

        let id = InstrumentId::new("RU000A105SG2");
        assert!(storage.get_instrument(&id).unwrap().is_some());
        let cny = storage.get_currency_rate(&CurrencyCode::CNY).unwrap().unwrap();
        assert_eq!(cny.rate, 12.6);
        assert_eq!(cny.quote, CurrencyCode::RUB);
        assert_eq!(storage.get_currency_rate(&CurrencyCode::EUR).unwrap(), None);
    }

    #[test]
    fn test_delete_instrument() {
        let storage = InMemoryStorage::new();
        storage.store_instrument(&InstrumentRecord::new("A")).unwrap();
        assert!(storage.delete_instrument("A").unwrap());
        assert!(!storage.delete_instrument("A").unwrap());
    }
}
