//! Currency resolution against the base currency.
//!
//! A resolved rate means "1 unit of face currency = rate units of base
//! currency". The base currency is always 1.0. Stored rates carry their own
//! quote currency, so a face currency resolves when:
//!
//! - its quote is the base: the stored rate is used as is;
//! - it shares a quote with the base: `rate(face) / rate(base)`;
//! - it is the base's quote: `1 / rate(base)`.
//!
//! Anything else is unresolved: it gets a rate of 0.0 and an
//! [`UnresolvedCurrency`](DiagnosticKind::UnresolvedCurrency) diagnostic, so
//! the holding is valued at zero but still reported.

use std::collections::HashMap;

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::{CurrencyRate, InstrumentStore};
use serde::Serialize;
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::PortfolioResult;
use crate::types::FxStatus;

/// A resolved rate and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FxResolution {
    /// Rate to base currency. Zero when unresolved.
    pub rate: f64,
    /// Resolution outcome.
    pub status: FxStatus,
}

impl FxResolution {
    /// The base currency itself.
    pub const BASE: Self = Self {
        rate: 1.0,
        status: FxStatus::Base,
    };

    /// No usable rate.
    pub const UNRESOLVED: Self = Self {
        rate: 0.0,
        status: FxStatus::Unresolved,
    };

    /// A usable rate from the store.
    #[must_use]
    pub fn resolved(rate: f64) -> Self {
        Self {
            rate,
            status: FxStatus::Resolved,
        }
    }
}

/// Rates for every currency in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FxTable {
    base: CurrencyCode,
    rates: HashMap<CurrencyCode, FxResolution>,
}

impl FxTable {
    /// Creates a table holding only the base currency.
    #[must_use]
    pub fn new(base: CurrencyCode) -> Self {
        let mut rates = HashMap::new();
        rates.insert(base, FxResolution::BASE);
        Self { base, rates }
    }

    /// Looks up every currency in `currencies` once.
    ///
    /// The base currency's own rate is read at most once, and only when a
    /// face currency is quoted in something other than the base.
    ///
    /// # Errors
    ///
    /// Store failures are fatal. A missing, unusable or uncrossable rate is
    /// not an error; it is recorded in `diagnostics`.
    pub fn resolve<'a, I>(
        store: &dyn InstrumentStore,
        base: CurrencyCode,
        currencies: I,
        diagnostics: &mut Diagnostics,
    ) -> PortfolioResult<Self>
    where
        I: IntoIterator<Item = &'a CurrencyCode>,
    {
        let mut table = Self::new(base);
        let mut base_rate: Option<Option<CurrencyRate>> = None;

        for code in currencies {
            if table.rates.contains_key(code) {
                continue;
            }

            let stored = store.get_currency_rate(code)?;
            let needs_base = stored.as_ref().map_or(true, |r| r.quote != base);
            if needs_base && base_rate.is_none() {
                base_rate = Some(store.get_currency_rate(&base)?.filter(CurrencyRate::is_usable));
            }
            let base_in_quote = base_rate.as_ref().and_then(Option::as_ref);

            let resolution = match cross_rate(*code, base, stored.as_ref(), base_in_quote) {
                Ok(rate) => {
                    debug!(currency = %code, rate, "resolved FX rate");
                    FxResolution::resolved(rate)
                }
                Err(detail) => {
                    diagnostics.push(Diagnostic::currency(
                        DiagnosticKind::UnresolvedCurrency,
                        *code,
                        format!("{detail}, holdings valued at zero"),
                    ));
                    FxResolution::UNRESOLVED
                }
            };
            table.rates.insert(*code, resolution);
        }
        Ok(table)
    }

    /// Base currency.
    #[must_use]
    pub fn base(&self) -> CurrencyCode {
        self.base
    }

    /// Rate for a currency. Unknown currencies are unresolved.
    #[must_use]
    pub fn get(&self, code: &CurrencyCode) -> FxResolution {
        self.rates
            .get(code)
            .copied()
            .unwrap_or(FxResolution::UNRESOLVED)
    }
}

/// Rate of `code` in `base` from its stored rate and the base's stored
/// rate. The error is a human-readable reason.
fn cross_rate(
    code: CurrencyCode,
    base: CurrencyCode,
    stored: Option<&CurrencyRate>,
    base_in_quote: Option<&CurrencyRate>,
) -> Result<f64, String> {
    let rate = match (stored, base_in_quote) {
        (Some(r), _) if !r.is_usable() => return Err(format!("unusable rate {}", r.rate)),
        (Some(r), _) if r.quote == base => r.rate,
        (Some(r), Some(b)) if b.quote == r.quote => r.rate / b.rate,
        (Some(r), _) => {
            return Err(format!("rate quoted in {} and no {base} rate in {}", r.quote, r.quote))
        }
        (None, Some(b)) if b.quote == code => 1.0 / b.rate,
        (None, _) => return Err(format!("no rate to {base} in store")),
    };
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("unusable cross rate {rate}"))
    }
}
