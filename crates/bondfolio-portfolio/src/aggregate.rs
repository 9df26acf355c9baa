//! Share-weighted metrics per face currency.
//!
//! Holdings are grouped by face currency in order of first appearance. A
//! group whose total portfolio share rounds to zero is residual noise and
//! produces no output. Otherwise shares are renormalized within the group
//! and used as weights.

use serde::Serialize;
use tracing::debug;

use bondfolio_core::types::CurrencyCode;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::parallel::maybe_parallel_fold;
use crate::types::{AnalyticsConfig, EnrichedHolding};

/// Holdings sharing one face currency.
#[derive(Debug, Clone)]
pub struct CurrencyBucket<'a> {
    /// Face currency.
    pub currency: CurrencyCode,
    /// Holdings in portfolio order.
    pub holdings: Vec<&'a EnrichedHolding>,
}

impl<'a> CurrencyBucket<'a> {
    /// Sum of portfolio shares before renormalization.
    #[must_use]
    pub fn total_share(&self) -> f64 {
        self.holdings.iter().map(|h| h.portfolio_share).sum()
    }

    /// Shares rescaled to sum to 1.0 within the bucket.
    ///
    /// All zero when the bucket's total share is zero.
    #[must_use]
    pub fn renormalized_shares(&self) -> Vec<f64> {
        let total = self.total_share();
        if total == 0.0 {
            return vec![0.0; self.holdings.len()];
        }
        self.holdings
            .iter()
            .map(|h| h.portfolio_share / total)
            .collect()
    }
}

/// Partitions holdings by face currency, in order of first appearance.
#[must_use]
pub fn bucket_by_currency(holdings: &[EnrichedHolding]) -> Vec<CurrencyBucket<'_>> {
    let mut buckets: Vec<CurrencyBucket<'_>> = Vec::new();
    for holding in holdings {
        let currency = holding.currency();
        match buckets.iter_mut().find(|b| b.currency == currency) {
            Some(bucket) => bucket.holdings.push(holding),
            None => buckets.push(CurrencyBucket {
                currency,
                holdings: vec![holding],
            }),
        }
    }
    buckets
}

/// Weighted portfolio metrics for one currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyMetrics {
    /// Face currency.
    pub currency: CurrencyCode,
    /// Number of holdings in the bucket.
    pub holdings_count: usize,
    /// Bucket's share of the whole portfolio.
    pub total_share: f64,
    /// Bucket's full value in base currency.
    pub value_base: f64,
    /// Weighted effective yield to maturity, percent.
    pub weighted_effective_yield: f64,
    /// Weighted quoted yield, percent.
    pub weighted_yield: f64,
    /// Weighted duration, days.
    pub weighted_duration_days: f64,
    /// Weighted coupon rate, percent.
    pub weighted_coupon_percent: f64,
    /// Weighted coupon period, days.
    pub weighted_coupon_period_days: f64,
    /// Weighted time to maturity, days.
    pub weighted_days_to_maturity: f64,
    /// Weighted time to maturity, years.
    pub weighted_years_to_maturity: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct WeightedSums {
    value_base: f64,
    effective_yield: f64,
    yield_quoted: f64,
    duration_days: f64,
    coupon_percent: f64,
    coupon_period_days: f64,
    days_to_maturity: f64,
}

impl WeightedSums {
    fn add(mut self, holding: &EnrichedHolding, weight: f64) -> Self {
        let inst = &holding.instrument;
        self.value_base += holding.full_value_base;
        self.effective_yield += weight * inst.effective_yield.unwrap_or(0.0);
        self.yield_quoted += weight * inst.yield_to_maturity.unwrap_or(0.0);
        self.duration_days += weight * inst.duration_days.unwrap_or(0.0);
        self.coupon_percent += weight * inst.coupon_percent.unwrap_or(0.0);
        self.coupon_period_days += weight * inst.coupon_period_days as f64;
        self.days_to_maturity += weight * inst.days_to_maturity as f64;
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            value_base: self.value_base + other.value_base,
            effective_yield: self.effective_yield + other.effective_yield,
            yield_quoted: self.yield_quoted + other.yield_quoted,
            duration_days: self.duration_days + other.duration_days,
            coupon_percent: self.coupon_percent + other.coupon_percent,
            coupon_period_days: self.coupon_period_days + other.coupon_period_days,
            days_to_maturity: self.days_to_maturity + other.days_to_maturity,
        }
    }
}

/// Computes weighted metrics for every currency with a nonzero share.
///
/// Missing optional metrics (effective yield, quoted yield, duration,
/// coupon percent) count as zero and raise a
/// [`MissingMetric`](DiagnosticKind::MissingMetric) diagnostic.
pub fn aggregate_by_currency(
    holdings: &[EnrichedHolding],
    config: &AnalyticsConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<CurrencyMetrics> {
    let mut metrics = Vec::new();

    for bucket in bucket_by_currency(holdings) {
        let total_share = bucket.total_share();
        if config.round_share(total_share) == 0.0 {
            debug!(
                currency = %bucket.currency,
                total_share,
                "skipping currency with zero share"
            );
            continue;
        }

        for holding in &bucket.holdings {
            report_missing_metrics(holding, diagnostics);
        }

        let weighted: Vec<(&EnrichedHolding, f64)> = bucket
            .holdings
            .iter()
            .copied()
            .zip(bucket.renormalized_shares())
            .collect();

        let sums = maybe_parallel_fold(
            &weighted,
            config,
            WeightedSums::default(),
            |acc, (holding, weight)| acc.add(holding, *weight),
            WeightedSums::merge,
        );

        metrics.push(CurrencyMetrics {
            currency: bucket.currency,
            holdings_count: bucket.holdings.len(),
            total_share,
            value_base: sums.value_base,
            weighted_effective_yield: sums.effective_yield,
            weighted_yield: sums.yield_quoted,
            weighted_duration_days: sums.duration_days,
            weighted_coupon_percent: sums.coupon_percent,
            weighted_coupon_period_days: sums.coupon_period_days,
            weighted_days_to_maturity: sums.days_to_maturity,
            weighted_years_to_maturity: sums.days_to_maturity / config.days_per_year,
        });
    }

    metrics
}

fn report_missing_metrics(holding: &EnrichedHolding, diagnostics: &mut Diagnostics) {
    let inst = &holding.instrument;
    let checks = [
        ("effective_yield", inst.effective_yield.is_none()),
        ("yield_to_maturity", inst.yield_to_maturity.is_none()),
        ("duration_days", inst.duration_days.is_none()),
        ("coupon_percent", inst.coupon_percent.is_none()),
    ];
    for (metric, is_missing) in checks {
        if is_missing {
            diagnostics.push(
                Diagnostic::instrument(
                    DiagnosticKind::MissingMetric,
                    holding.id(),
                    format!("{metric} missing, weighted as zero"),
                )
                .with_currency(holding.currency()),
            );
        }
    }
}
