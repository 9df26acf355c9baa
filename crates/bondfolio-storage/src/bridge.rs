//! Engine-facing store traits for every backend.

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::{
    CurrencyRate, InstrumentId, InstrumentRecord, InstrumentSink, InstrumentStore, TraitError,
};

use crate::adapter::StorageAdapter;
use crate::memory::InMemoryStorage;
use crate::redb::RedbStorage;

macro_rules! impl_instrument_traits {
    ($backend:ty) => {
        impl InstrumentStore for $backend {
            fn get_instrument(
                &self,
                id: &InstrumentId,
            ) -> Result<Option<InstrumentRecord>, TraitError> {
                Ok(self.read_instrument(id.as_str())?)
            }

            fn get_currency_rate(
                &self,
                code: &CurrencyCode,
            ) -> Result<Option<CurrencyRate>, TraitError> {
                Ok(self.read_currency_rate(code)?)
            }
        }

        impl InstrumentSink for $backend {
            fn put_instrument(&self, record: &InstrumentRecord) -> Result<(), TraitError> {
                Ok(self.store_instrument(record)?)
            }

            fn put_currency_rates(&self, rates: &[CurrencyRate]) -> Result<(), TraitError> {
                Ok(self.store_currency_rates(rates)?)
            }

            fn clear_instruments(&self) -> Result<usize, TraitError> {
                Ok(self.purge_instruments()?)
            }
        }
    };
}

impl_instrument_traits!(InMemoryStorage);
impl_instrument_traits!(RedbStorage);
