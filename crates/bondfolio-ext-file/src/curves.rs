//! CSV benchmark curve source.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::error::TraitError;
use bondfolio_traits::{BenchmarkCurve, BenchmarkCurveSource, CurvePoint};
use serde::Deserialize;
use tracing::debug;

// =============================================================================
// CSV BENCHMARK CURVE SOURCE
// =============================================================================

/// CSV record for curve points.
#[derive(Debug, Deserialize)]
struct CurvePointRecord {
    currency: String,
    period: f64,
    value: f64,
}

/// Benchmark curves read from a CSV file.
///
/// ```text
/// currency,period,value
/// RUB,0.25,20.1
/// RUB,1,18.9
/// USD,2,4.3
/// ```
///
/// `period` is in years, `value` is a yield in percent. Rows of one
/// currency form one curve; row order does not matter.
#[derive(Debug, Clone, Default)]
pub struct CsvBenchmarkCurveSource {
    curves: BTreeMap<CurrencyCode, BenchmarkCurve>,
}

impl CsvBenchmarkCurveSource {
    /// Loads curves from a file.
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self, TraitError> {
        let path = file_path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| TraitError::IoError(format!("{}: {e}", path.display())))?;
        Self::from_reader(file)
    }

    /// Loads curves from any reader.
    pub fn from_reader<R: Read>(input: R) -> Result<Self, TraitError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(input);

        let mut points: BTreeMap<CurrencyCode, Vec<CurvePoint>> = BTreeMap::new();
        for result in reader.deserialize() {
            let record: CurvePointRecord =
                result.map_err(|e| TraitError::Format(e.to_string()))?;
            let currency = CurrencyCode::new(&record.currency)
                .map_err(|e| TraitError::Format(e.to_string()))?;
            points
                .entry(currency)
                .or_default()
                .push(CurvePoint::new(record.period, record.value));
        }

        let mut curves = BTreeMap::new();
        for (currency, points) in points {
            let curve = BenchmarkCurve::new(currency, points)
                .map_err(|e| TraitError::Format(e.to_string()))?;
            debug!(%currency, points = curve.points().len(), "benchmark curve loaded");
            curves.insert(currency, curve);
        }
        Ok(Self { curves })
    }

    /// Currencies with a curve, sorted.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        self.curves.keys().copied().collect()
    }
}

impl BenchmarkCurveSource for CsvBenchmarkCurveSource {
    fn benchmark_curve(
        &self,
        currency: &CurrencyCode,
    ) -> Result<Option<BenchmarkCurve>, TraitError> {
        Ok(self.curves.get(currency).cloned())
    }
}
