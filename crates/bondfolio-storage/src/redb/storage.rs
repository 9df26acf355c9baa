//! RedbStorage implementation.
//!
//! Implements the StorageAdapter trait using redb as the underlying database.
//! Instruments are keyed by ISIN, currency rates by ISO code. Values are
//! JSON envelopes (see [`crate::schema`]).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::{CurrencyRate, InstrumentRecord};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::debug;

use crate::adapter::{StorageAdapter, StorageStats};
use crate::error::StorageResult;
use crate::schema::{decode, encode, RecordKind};

// Table definitions
const INSTRUMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("instruments");
const CURRENCY_RATES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("currency_rates");

/// Redb-based storage adapter.
///
/// This adapter uses redb, a pure-Rust embedded database, for persistent storage.
/// It provides ACID transactions and is suitable for single-process applications.
///
/// # Example
///
/// ```rust,ignore
/// use bondfolio_storage::{RedbStorage, StorageAdapter};
///
/// let storage = RedbStorage::open("./bonds.redb")?;
/// assert!(storage.is_healthy());
/// ```
pub struct RedbStorage {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbStorage {
    /// Opens or creates a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(&path)?;
        let storage = Self {
            db: Arc::new(db),
            path,
        };
        storage.initialize_tables()?;
        debug!(path = %storage.path.display(), "opened instrument store");
        Ok(storage)
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Initializes all required tables.
    fn initialize_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            // Create tables if they don't exist
            let _ = write_txn.open_table(INSTRUMENTS_TABLE)?;
            let _ = write_txn.open_table(CURRENCY_RATES_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl StorageAdapter for RedbStorage {
    fn backend_name(&self) -> &'static str {
        "redb"
    }

    fn is_healthy(&self) -> bool {
        self.db.begin_read().is_ok()
    }

    // =========================================================================
    // INSTRUMENT OPERATIONS
    // =========================================================================

    fn store_instrument(&self, record: &InstrumentRecord) -> StorageResult<()> {
        let data = encode(RecordKind::Instrument, record)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(INSTRUMENTS_TABLE)?;
            table.insert(record.instrument_id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn read_instrument(&self, isin: &str) -> StorageResult<Option<InstrumentRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INSTRUMENTS_TABLE)?;
        match table.get(isin)? {
            Some(data) => Ok(Some(decode(RecordKind::Instrument, data.value())?)),
            None => Ok(None),
        }
    }

    fn delete_instrument(&self, isin: &str) -> StorageResult<bool> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(INSTRUMENTS_TABLE)?;
            let result = table.remove(isin)?;
            result.is_some()
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    fn list_instruments(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INSTRUMENTS_TABLE)?;

        let mut isins = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            isins.push(key.value().to_string());
        }
        Ok(isins)
    }

    fn purge_instruments(&self) -> StorageResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(INSTRUMENTS_TABLE)?;
            let count = table.len()? as usize;
            table.retain(|_, _| false)?;
            count
        };
        write_txn.commit()?;
        debug!(removed, "purged instrument cache");
        Ok(removed)
    }

    // =========================================================================
    // CURRENCY RATE OPERATIONS
    // =========================================================================

    fn store_currency_rates(&self, rates: &[CurrencyRate]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CURRENCY_RATES_TABLE)?;
            for rate in rates {
                let data = encode(RecordKind::CurrencyRate, rate)?;
                table.insert(rate.currency.as_str(), data.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn read_currency_rate(&self, code: &CurrencyCode) -> StorageResult<Option<CurrencyRate>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CURRENCY_RATES_TABLE)?;
        match table.get(code.as_str())? {
            Some(data) => Ok(Some(decode(RecordKind::CurrencyRate, data.value())?)),
            None => Ok(None),
        }
    }

    fn list_currency_rates(&self) -> StorageResult<Vec<CurrencyRate>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CURRENCY_RATES_TABLE)?;

        let mut rates = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            rates.push(decode(RecordKind::CurrencyRate, value.value())?);
        }
        Ok(rates)
    }

    // =========================================================================
    // UTILITY OPERATIONS
    // =========================================================================

    fn stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;

        let instrument_count = {
            let table = read_txn.open_table(INSTRUMENTS_TABLE)?;
            table.len()? as usize
        };

        let currency_rate_count = {
            let table = read_txn.open_table(CURRENCY_RATES_TABLE)?;
            table.len()? as usize
        };

        Ok(StorageStats {
            instrument_count,
            currency_rate_count,
            file_size_bytes: std::fs::metadata(&self.path).ok().map(|m| m.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondfolio_core::types::Date;
    use bondfolio_traits::{InstrumentId, InstrumentSink, InstrumentStore};
    use tempfile::tempdir;

    fn create_test_storage() -> RedbStorage {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.redb");
        // Keep the tempdir alive by leaking it (for tests only)
        std::mem::forget(dir);
        RedbStorage::open(path).unwrap()
    }

    fn bond(isin: &str) -> InstrumentRecord {
        InstrumentRecord {
            secid: Some(isin.to_string()),
            face_value: Some(1000.0),
            lot_size: Some(1),
            face_currency: Some("RUB".into()),
            coupon_value: Some(50.0),
            coupon_period_days: Some(182),
            next_coupon_date: Some("2025-02-04".into()),
            maturity_date: Some("2026-08-04".into()),
            last_price: Some(98.0),
            ..InstrumentRecord::new(isin)
        }
    }

    #[test]
    fn test_backend_name() {
        let storage = create_test_storage();
        assert_eq!(storage.backend_name(), "redb");
    }

    #[test]
    fn test_is_healthy() {
        let storage = create_test_storage();
        assert!(storage.is_healthy());
    }

    #[test]
    fn test_instrument_crud() {
        let storage = create_test_storage();

        // Create
        storage.store_instrument(&bond("RU000A0JX0J2")).unwrap();

        // Read
        let cached = storage.read_instrument("RU000A0JX0J2").unwrap().unwrap();
        assert_eq!(cached, bond("RU000A0JX0J2"));
        assert!(storage.read_instrument("RU000A0ZZZZ0").unwrap().is_none());

        // Update
        let mut updated = bond("RU000A0JX0J2");
        updated.last_price = Some(101.25);
        storage.store_instrument(&updated).unwrap();
        let cached = storage.read_instrument("RU000A0JX0J2").unwrap().unwrap();
        assert_eq!(cached.last_price, Some(101.25));

        // Delete
        assert!(storage.delete_instrument("RU000A0JX0J2").unwrap());
        assert!(storage.read_instrument("RU000A0JX0J2").unwrap().is_none());
    }

    #[test]
    fn test_list_instruments_sorted() {
        let storage = create_test_storage();
        for isin in ["RU000C", "RU000A", "RU000B"] {
            storage.store_instrument(&bond(isin)).unwrap();
        }
        assert_eq!(
            storage.list_instruments().unwrap(),
            vec!["RU000A", "RU000B", "RU000C"]
        );
    }

    #[test]
    fn test_purge_instruments() {
        let storage = create_test_storage();
        storage.store_instrument(&bond("A")).unwrap();
        storage.store_instrument(&bond("B")).unwrap();
        storage
            .store_currency_rates(&[CurrencyRate::new(CurrencyCode::USD, CurrencyCode::RUB, 92.0)])
            .unwrap();

        assert_eq!(storage.purge_instruments().unwrap(), 2);
        assert_eq!(storage.purge_instruments().unwrap(), 0);

        let stats = storage.stats().unwrap();
        assert_eq!(stats.instrument_count, 0);
        assert_eq!(stats.currency_rate_count, 1);
        assert!(stats.file_size_bytes.unwrap_or(0) > 0);
    }

    #[test]
    fn test_currency_rates() {
        let storage = create_test_storage();
        let fixing = Date::from_ymd(2025, 1, 14).unwrap();
        storage
            .store_currency_rates(&[
                CurrencyRate::new(CurrencyCode::USD, CurrencyCode::RUB, 101.68).with_trade_date(fixing),
                CurrencyRate::new(CurrencyCode::CNY, CurrencyCode::RUB, 13.9),
            ])
            .unwrap();

        let usd = storage.read_currency_rate(&CurrencyCode::USD).unwrap().unwrap();
        assert_eq!(usd.rate, 101.68);
        assert_eq!(usd.trade_date, Some(fixing));
        assert_eq!(usd.quote, CurrencyCode::RUB);

        // Replaces, never accumulates
        storage
            .store_currency_rates(&[CurrencyRate::new(CurrencyCode::USD, CurrencyCode::RUB, 99.0)])
            .unwrap();
        let listed = storage.list_currency_rates().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].currency, CurrencyCode::CNY);
        assert_eq!(listed[1].rate, 99.0);
    }

    #[test]
    fn test_reopen_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache").join("bonds.redb");
        {
            let storage = RedbStorage::open(&path).unwrap();
            storage.store_instrument(&bond("RU000A105SG2")).unwrap();
        }
        let storage = RedbStorage::open(&path).unwrap();
        assert_eq!(storage.list_instruments().unwrap(), vec!["RU000A105SG2"]);
    }

    #[test]
    fn test_store_traits() {
        let storage = create_test_storage();
        storage.put_instrument(&bond("RU000A0JX0J2")).unwrap();
        storage
            .put_currency_rates(&[CurrencyRate::new(CurrencyCode::EUR, CurrencyCode::RUB, 107.5)])
            .unwrap();

        let id = InstrumentId::new("RU000A0JX0J2");
        assert!(storage.get_instrument(&id).unwrap().is_some());
        let eur = storage.get_currency_rate(&CurrencyCode::EUR).unwrap().unwrap();
        assert_eq!(eur.rate, 107.5);
        assert_eq!(storage.clear_instruments().unwrap(), 1);
        assert!(storage.get_instrument(&id).unwrap().is_none());
    }
}
