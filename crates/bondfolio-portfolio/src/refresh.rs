//! Market data refresh: rebuild the instrument cache from a data source.
//!
//! The cache holds the latest snapshot only, so a refresh clears the
//! instrument table before fetching. Currency rates are replaced in place.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, info_span, warn};

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::{CurrencyRate, Holding, InstrumentId, InstrumentSink, MarketDataSource};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::PortfolioResult;

/// Outcome of a refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshSummary {
    /// Instruments fetched and stored.
    pub fetched: usize,
    /// Instruments the source does not know.
    pub missing: usize,
    /// Instruments whose fetch failed.
    pub failed: usize,
    /// Currency rates stored.
    pub currencies: usize,
    /// Per-instrument problems.
    pub diagnostics: Diagnostics,
}

/// Refreshes the cache for every distinct instrument in `holdings`.
///
/// A source failure for one instrument, or for the currency rates, is
/// recorded as a [`FetchFailed`](DiagnosticKind::FetchFailed) diagnostic and
/// the refresh goes on.
///
/// # Errors
///
/// Sink failures abort the refresh.
pub fn refresh_market_data(
    source: &dyn MarketDataSource,
    sink: &dyn InstrumentSink,
    holdings: &[Holding],
) -> PortfolioResult<RefreshSummary> {
    let span = info_span!("refresh", holdings = holdings.len());
    let _guard = span.enter();

    let cleared = sink.clear_instruments()?;
    info!(cleared, "cleared cached instruments");

    let mut summary = RefreshSummary::default();
    let mut seen: HashSet<&InstrumentId> = HashSet::new();

    for holding in holdings {
        let id = &holding.instrument_id;
        if !seen.insert(id) {
            continue;
        }
        match source.fetch_instrument(id) {
            Ok(Some(record)) => {
                sink.put_instrument(&record)?;
                summary.fetched += 1;
            }
            Ok(None) => {
                summary.missing += 1;
                summary.diagnostics.push(Diagnostic::instrument(
                    DiagnosticKind::MissingRecord,
                    id,
                    "not found at market data source",
                ));
            }
            Err(e) => {
                summary.failed += 1;
                summary.diagnostics.push(Diagnostic::instrument(
                    DiagnosticKind::FetchFailed,
                    id,
                    e.to_string(),
                ));
            }
        }
    }

    match source.fetch_currency_rates() {
        Ok(mut rates) => {
            rates.sort_by_key(|r| r.currency);
            sink.put_currency_rates(&rates)?;
            summary.currencies = rates.len();
        }
        Err(e) => {
            warn!(error = %e, "currency rates not refreshed");
            summary.diagnostics.push(Diagnostic::portfolio(
                DiagnosticKind::FetchFailed,
                format!("currency rates: {e}"),
            ));
        }
    }

    info!(
        fetched = summary.fetched,
        missing = summary.missing,
        failed = summary.failed,
        currencies = summary.currencies,
        "refresh complete"
    );
    Ok(summary)
}

/// Returns the currencies present in a rate list, sorted.
#[must_use]
pub fn rate_currencies(rates: &[CurrencyRate]) -> Vec<CurrencyCode> {
    let mut codes: Vec<CurrencyCode> = rates.iter().map(|r| r.currency).collect();
    codes.sort();
    codes.dedup();
    codes
}
