//! The portfolio run: holdings in, report out.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, info_span};

use bondfolio_core::types::{CurrencyCode, Date};
use bondfolio_traits::{Holding, InstrumentId, InstrumentRecord, InstrumentStore};

use crate::aggregate::{aggregate_by_currency, CurrencyMetrics};
use crate::calendar::{project_calendar, MonthlyCalendar};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{PortfolioError, PortfolioResult};
use crate::fx::FxTable;
use crate::normalize::{NormalizeError, Normalized, NormalizeWarning};
use crate::types::{AnalyticsConfig, EnrichedHolding, NormalizedInstrument};
use crate::valuation::value_holdings;

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    /// Valuation date.
    pub as_of: Date,
    /// Reporting currency.
    pub base_currency: CurrencyCode,
    /// Valued holdings in portfolio order.
    pub holdings: Vec<EnrichedHolding>,
    /// Metrics per currency with a nonzero share.
    pub currency_metrics: Vec<CurrencyMetrics>,
    /// Monthly coupon and principal flows.
    pub calendar: MonthlyCalendar,
    /// Total full value in base currency.
    pub total_value_base: f64,
    /// Every recoverable problem found.
    pub diagnostics: Diagnostics,
}

impl PortfolioReport {
    /// Metrics for one currency.
    #[must_use]
    pub fn metrics_for(&self, currency: CurrencyCode) -> Option<&CurrencyMetrics> {
        self.currency_metrics.iter().find(|m| m.currency == currency)
    }

    /// A valued holding by identifier.
    #[must_use]
    pub fn holding(&self, id: &InstrumentId) -> Option<&EnrichedHolding> {
        self.holdings.iter().find(|h| h.id() == id)
    }
}

/// Runs the portfolio pipeline against an instrument store.
///
/// # Example
///
/// ```ignore
/// let engine = PortfolioEngine::new(&store, AnalyticsConfig::new(today));
/// let report = engine.run(&holdings)?;
/// ```
pub struct PortfolioEngine<'a> {
    store: &'a dyn InstrumentStore,
    config: AnalyticsConfig,
}

impl<'a> PortfolioEngine<'a> {
    /// Creates an engine reading from `store`.
    #[must_use]
    pub fn new(store: &'a dyn InstrumentStore, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }

    /// Run configuration.
    #[must_use]
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Normalizes one stored record with this engine's columns and date.
    ///
    /// # Errors
    ///
    /// Returns the normalization failure for the record.
    pub fn normalize_record(&self, record: &InstrumentRecord) -> Result<Normalized, NormalizeError> {
        self.config.normalizer().normalize(&record.to_row())
    }

    /// Values the portfolio.
    ///
    /// Instruments that are missing or malformed are dropped with a
    /// diagnostic; the run only fails when nothing is left to report.
    ///
    /// # Errors
    ///
    /// - `EmptyPortfolio` if `holdings` is empty
    /// - `DataSource` if the store fails
    /// - `NoValuedHoldings` if every holding was dropped
    /// - `NoNonzeroCurrency` if no currency has a nonzero share
    pub fn run(&self, holdings: &[Holding]) -> PortfolioResult<PortfolioReport> {
        let span = info_span!("portfolio_run", as_of = %self.config.as_of, holdings = holdings.len());
        let _guard = span.enter();

        if holdings.is_empty() {
            return Err(PortfolioError::EmptyPortfolio);
        }

        let mut diagnostics = Diagnostics::new();
        let merged = merge_duplicates(holdings, &mut diagnostics);
        let positions = self.load_instruments(&merged, &mut diagnostics)?;

        let currencies: Vec<CurrencyCode> = positions.iter().map(|(i, _)| i.face_currency).collect();
        let fx = FxTable::resolve(
            self.store,
            self.config.base_currency,
            &currencies,
            &mut diagnostics,
        )?;

        let valued = value_holdings(&positions, &fx, &self.config, &mut diagnostics);
        if valued.is_empty() {
            return Err(PortfolioError::NoValuedHoldings {
                dropped: merged.len(),
            });
        }

        let currency_metrics = aggregate_by_currency(&valued, &self.config, &mut diagnostics);
        if currency_metrics.is_empty() {
            let currencies: HashSet<CurrencyCode> = valued.iter().map(EnrichedHolding::currency).collect();
            return Err(PortfolioError::NoNonzeroCurrency {
                currencies: currencies.len(),
            });
        }

        let calendar = project_calendar(&valued, &self.config);
        let total_value_base = valued.iter().map(|h| h.full_value_base).sum();

        info!(
            valued = valued.len(),
            dropped = merged.len() - valued.len(),
            currencies = currency_metrics.len(),
            months = calendar.len(),
            diagnostics = diagnostics.len(),
            total_value_base,
            "portfolio valued"
        );

        Ok(PortfolioReport {
            as_of: self.config.as_of,
            base_currency: self.config.base_currency,
            holdings: valued,
            currency_metrics,
            calendar,
            total_value_base,
            diagnostics,
        })
    }

    fn load_instruments(
        &self,
        holdings: &[Holding],
        diagnostics: &mut Diagnostics,
    ) -> PortfolioResult<Vec<(NormalizedInstrument, i64)>> {
        let normalizer = self.config.normalizer();
        let mut missing_drop_columns: Vec<String> = Vec::new();
        let mut positions = Vec::with_capacity(holdings.len());

        for holding in holdings {
            let id = &holding.instrument_id;
            let Some(record) = self.store.get_instrument(id)? else {
                diagnostics.push(Diagnostic::instrument(
                    DiagnosticKind::MissingRecord,
                    id,
                    "instrument not found in store, dropped",
                ));
                continue;
            };

            let normalized = match normalizer.normalize(&record.to_row()) {
                Ok(n) => n,
                Err(e) => {
                    diagnostics.push(Diagnostic::instrument(
                        DiagnosticKind::DateParse,
                        id,
                        format!("{e}, dropped"),
                    ));
                    continue;
                }
            };
            for NormalizeWarning::MissingDropColumn { column } in normalized.warnings {
                if !missing_drop_columns.contains(&column) {
                    diagnostics.push(Diagnostic::portfolio(
                        DiagnosticKind::MissingDropColumn,
                        format!("column '{column}' listed for dropping does not exist"),
                    ));
                    missing_drop_columns.push(column);
                }
            }

            match NormalizedInstrument::from_row(id, &normalized.row) {
                Ok(instrument) => {
                    debug!(instrument = %id, currency = %instrument.face_currency, "loaded instrument");
                    positions.push((instrument, holding.lot_count));
                }
                Err(e) => diagnostics.push(Diagnostic::instrument(
                    DiagnosticKind::MissingField,
                    id,
                    format!("{e}, dropped"),
                )),
            }
        }

        Ok(positions)
    }
}

/// Merges holdings that name the same instrument, summing lot counts.
///
/// Keeps the position of the first occurrence.
fn merge_duplicates(holdings: &[Holding], diagnostics: &mut Diagnostics) -> Vec<Holding> {
    let mut merged: Vec<Holding> = Vec::with_capacity(holdings.len());
    for holding in holdings {
        match merged
            .iter_mut()
            .find(|h| h.instrument_id == holding.instrument_id)
        {
            Some(existing) => {
                existing.lot_count += holding.lot_count;
                diagnostics.push(Diagnostic::instrument(
                    DiagnosticKind::DuplicateHolding,
                    &holding.instrument_id,
                    format!("listed more than once, lots merged to {}", existing.lot_count),
                ));
            }
            None => merged.push(holding.clone()),
        }
    }
    merged
}
