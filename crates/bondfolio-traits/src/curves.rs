//! Benchmark (risk-free) yield curves.
//!
//! A benchmark curve is a set of `(tenor in years, yield in percent)` points
//! for one currency, supplied from outside the engine. The engine only reads
//! it to compare a portfolio's weighted maturity and YTM against it.

use bondfolio_core::types::CurrencyCode;
use serde::{Deserialize, Serialize};

use crate::error::TraitError;

/// One point on a benchmark curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Tenor in years.
    pub years: f64,
    /// Yield in percent.
    pub value: f64,
}

impl CurvePoint {
    /// Creates a curve point.
    #[must_use]
    pub fn new(years: f64, value: f64) -> Self {
        Self { years, value }
    }
}

/// A benchmark yield curve for one currency.
///
/// # Example
///
/// ```rust
/// use bondfolio_core::types::CurrencyCode;
/// use bondfolio_traits::curves::{BenchmarkCurve, CurvePoint};
///
/// let curve = BenchmarkCurve::new(
///     CurrencyCode::RUB,
///     vec![CurvePoint::new(1.0, 16.0), CurvePoint::new(2.0, 15.0)],
/// )
/// .unwrap();
/// assert!((curve.yield_at(1.5) - 15.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkCurve {
    currency: CurrencyCode,
    points: Vec<CurvePoint>,
}

impl BenchmarkCurve {
    /// Creates a curve, sorting points by tenor.
    ///
    /// # Errors
    ///
    /// Returns `TraitError::InvalidInput` if there are no points, a value is
    /// not finite, or two points share a tenor.
    pub fn new(currency: CurrencyCode, mut points: Vec<CurvePoint>) -> Result<Self, TraitError> {
        if points.is_empty() {
            return Err(TraitError::InvalidInput(format!(
                "benchmark curve for {currency} has no points"
            )));
        }
        if points
            .iter()
            .any(|p| !p.years.is_finite() || !p.value.is_finite())
        {
            return Err(TraitError::InvalidInput(format!(
                "benchmark curve for {currency} has non-finite points"
            )));
        }

        points.sort_by(|a, b| a.years.total_cmp(&b.years));
        if points.windows(2).any(|w| w[1].years <= w[0].years) {
            return Err(TraitError::InvalidInput(format!(
                "benchmark curve for {currency}: tenors must be strictly increasing"
            )));
        }

        Ok(Self { currency, points })
    }

    /// Currency of the curve.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Curve points, sorted by tenor.
    #[must_use]
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Shortest tenor.
    #[must_use]
    pub fn min_years(&self) -> f64 {
        self.points[0].years
    }

    /// Longest tenor.
    #[must_use]
    pub fn max_years(&self) -> f64 {
        self.points[self.points.len() - 1].years
    }

    /// Yield at a tenor.
    ///
    /// Linear between points; flat beyond the first and last point.
    #[must_use]
    pub fn yield_at(&self, years: f64) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if years <= first.years {
            return first.value;
        }
        if years >= last.years {
            return last.value;
        }

        let i = self.find_segment(years);
        let (p0, p1) = (self.points[i], self.points[i + 1]);
        let t = (years - p0.years) / (p1.years - p0.years);
        p0.value + t * (p1.value - p0.value)
    }

    /// Finds the index i such that points[i].years <= x < points[i+1].years.
    fn find_segment(&self, x: f64) -> usize {
        let last_segment = self.points.len().saturating_sub(2);
        match self.points.binary_search_by(|probe| probe.years.total_cmp(&x)) {
            Ok(i) => i.min(last_segment),
            Err(i) => i.saturating_sub(1).min(last_segment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rub_curve() -> BenchmarkCurve {
        BenchmarkCurve::new(
            CurrencyCode::RUB,
            vec![
                CurvePoint::new(5.0, 14.0),
                CurvePoint::new(0.25, 18.0),
                CurvePoint::new(1.0, 17.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_points_are_sorted() {
        let curve = rub_curve();
        let tenors: Vec<f64> = curve.points().iter().map(|p| p.years).collect();
        assert_eq!(tenors, vec![0.25, 1.0, 5.0]);
        assert_relative_eq!(curve.min_years(), 0.25);
        assert_relative_eq!(curve.max_years(), 5.0);
    }

    #[test]
    fn test_linear_between_points() {
        let curve = rub_curve();
        assert_relative_eq!(curve.yield_at(1.0), 17.0);
        assert_relative_eq!(curve.yield_at(3.0), 15.5);
        assert_relative_eq!(curve.yield_at(0.625), 17.5);
    }

    #[test]
    fn test_flat_extrapolation() {
        let curve = rub_curve();
        assert_relative_eq!(curve.yield_at(0.0), 18.0);
        assert_relative_eq!(curve.yield_at(30.0), 14.0);
    }

    #[test]
    fn test_single_point_curve() {
        let curve =
            BenchmarkCurve::new(CurrencyCode::USD, vec![CurvePoint::new(10.0, 4.2)]).unwrap();
        assert_relative_eq!(curve.yield_at(2.0), 4.2);
        assert_relative_eq!(curve.yield_at(12.0), 4.2);
    }

    #[test]
    fn test_rejects_invalid_curves() {
        assert!(BenchmarkCurve::new(CurrencyCode::USD, vec![]).is_err());
        assert!(BenchmarkCurve::new(
            CurrencyCode::USD,
            vec![CurvePoint::new(1.0, 4.0), CurvePoint::new(1.0, 4.1)]
        )
        .is_err());
        assert!(
            BenchmarkCurve::new(CurrencyCode::USD, vec![CurvePoint::new(f64::NAN, 4.0)]).is_err()
        );
    }
}
