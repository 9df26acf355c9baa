//! Full value and portfolio share of each holding.
//!
//! ```text
//! full_value_base = face * price / 100 * fx * lots * lot_size
//!                 + (period - days_to_next_coupon) / period * coupon * fx
//! share           = full_value_base / sum(full_value_base)
//! ```
//!
//! The accrued coupon term is per bond and is not scaled by the lot count.

use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::fx::FxTable;
use crate::parallel::maybe_parallel_map;
use crate::types::{AnalyticsConfig, EnrichedHolding, FxStatus, NormalizedInstrument};

/// Full value of a position in base currency.
///
/// Returns `None` when the coupon period is not positive.
#[must_use]
pub fn full_value_base(instrument: &NormalizedInstrument, lot_count: i64, fx_rate: f64) -> Option<f64> {
    if instrument.coupon_period_days <= 0 {
        return None;
    }
    let period = instrument.coupon_period_days as f64;
    let days_to_next = instrument.days_to_next_coupon as f64;

    let market = instrument.face_value * instrument.price() / 100.0
        * fx_rate
        * lot_count as f64
        * instrument.lot_size as f64;
    let accrued = (period - days_to_next) / period * instrument.coupon_value * fx_rate;

    Some(market + accrued)
}

/// Values every position and assigns portfolio shares.
///
/// Positions with a non-positive coupon period are excluded with a
/// [`DivideByZeroGuard`](DiagnosticKind::DivideByZeroGuard) diagnostic. If
/// the remaining total is zero, every share is zero and one portfolio-level
/// diagnostic is raised. Output order follows input order.
pub fn value_holdings(
    positions: &[(NormalizedInstrument, i64)],
    fx: &FxTable,
    config: &AnalyticsConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<EnrichedHolding> {
    let valued = maybe_parallel_map(positions, config, |(instrument, lot_count)| {
        let resolution = fx.get(&instrument.face_currency);
        full_value_base(instrument, *lot_count, resolution.rate).map(|value| EnrichedHolding {
            instrument: instrument.clone(),
            lot_count: *lot_count,
            fx_rate_to_base: resolution.rate,
            fx_status: resolution.status,
            full_value_base: value,
            portfolio_share: 0.0,
        })
    });

    let mut holdings = Vec::with_capacity(valued.len());
    for ((instrument, _), result) in positions.iter().zip(valued) {
        match result {
            Some(holding) => {
                if holding.fx_status == FxStatus::Unresolved {
                    diagnostics.push(
                        Diagnostic::instrument(
                            DiagnosticKind::UnresolvedCurrency,
                            holding.id(),
                            "no FX rate, holding valued at zero",
                        )
                        .with_currency(holding.currency()),
                    );
                }
                holdings.push(holding);
            }
            None => diagnostics.push(
                Diagnostic::instrument(
                    DiagnosticKind::DivideByZeroGuard,
                    &instrument.instrument_id,
                    format!(
                        "coupon period is {} days, instrument excluded",
                        instrument.coupon_period_days
                    ),
                )
                .with_currency(instrument.face_currency),
            ),
        }
    }

    let total: f64 = holdings.iter().map(|h| h.full_value_base).sum();
    if total.abs() < f64::EPSILON {
        if !holdings.is_empty() {
            diagnostics.push(Diagnostic::portfolio(
                DiagnosticKind::DivideByZeroGuard,
                "portfolio total value is zero, all shares set to zero",
            ));
        }
        return holdings;
    }

    for holding in &mut holdings {
        holding.portfolio_share = holding.full_value_base / total;
    }
    debug!(holdings = holdings.len(), total, "valued holdings");

    holdings
}
