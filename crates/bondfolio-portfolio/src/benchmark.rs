//! Comparison of currency metrics against a risk-free benchmark curve.
//!
//! The portfolio point of a currency is (weighted years to maturity,
//! weighted effective yield). It is compared with the benchmark yield at
//! the same tenor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::{BenchmarkCurve, BenchmarkCurveSource};

use crate::aggregate::CurrencyMetrics;
use crate::error::{PortfolioError, PortfolioResult};

/// Portfolio point versus the benchmark curve for one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    /// Currency.
    pub currency: CurrencyCode,
    /// Weighted years to maturity.
    pub years_to_maturity: f64,
    /// Weighted effective yield, percent.
    pub portfolio_ytm: f64,
    /// Benchmark yield at the same tenor, percent.
    pub benchmark_yield: f64,
    /// Portfolio minus benchmark, basis points.
    pub spread_bp: f64,
    /// False when the tenor is outside the curve and the yield was
    /// extrapolated flat.
    pub within_curve: bool,
}

impl BenchmarkComparison {
    /// Returns true if the portfolio yields more than the benchmark.
    #[must_use]
    pub fn is_above_curve(&self) -> bool {
        self.spread_bp > 0.0
    }
}

/// Compares one currency's metrics with its benchmark curve.
///
/// # Errors
///
/// Returns `PortfolioError::CurrencyMismatch` if the curve is for another
/// currency.
pub fn compare_to_benchmark(
    metrics: &CurrencyMetrics,
    curve: &BenchmarkCurve,
) -> PortfolioResult<BenchmarkComparison> {
    if curve.currency() != metrics.currency {
        return Err(PortfolioError::CurrencyMismatch {
            expected: metrics.currency.to_string(),
            got: curve.currency().to_string(),
        });
    }

    let years = metrics.weighted_years_to_maturity;
    let benchmark_yield = curve.yield_at(years);

    Ok(BenchmarkComparison {
        currency: metrics.currency,
        years_to_maturity: years,
        portfolio_ytm: metrics.weighted_effective_yield,
        benchmark_yield,
        spread_bp: (metrics.weighted_effective_yield - benchmark_yield) * 100.0,
        within_curve: years >= curve.min_years() && years <= curve.max_years(),
    })
}

/// Compares every currency that has a curve in `source`.
///
/// Currencies without a curve are skipped.
///
/// # Errors
///
/// Source failures are returned as `PortfolioError::DataSource`.
pub fn compare_all(
    metrics: &[CurrencyMetrics],
    source: &dyn BenchmarkCurveSource,
) -> PortfolioResult<Vec<BenchmarkComparison>> {
    let mut comparisons = Vec::with_capacity(metrics.len());
    for m in metrics {
        match source.benchmark_curve(&m.currency)? {
            Some(curve) => comparisons.push(compare_to_benchmark(m, &curve)?),
            None => debug!(currency = %m.currency, "no benchmark curve"),
        }
    }
    Ok(comparisons)
}
