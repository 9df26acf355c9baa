//! Market data source over a directory of saved ISS documents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::error::TraitError;
use bondfolio_traits::{
    BenchmarkCurve, BenchmarkCurveSource, CurrencyRate, InstrumentId, InstrumentRecord,
    MarketDataSource,
};
use tracing::debug;

use crate::iss::IssDocument;

/// File name of the currency index document.
pub const CURRENCIES_FILE: &str = "currencies.json";

/// File name of the ruble zero-coupon curve document.
pub const ZERO_CURVE_FILE: &str = "zcyc.json";

// =============================================================================
// ISS DIRECTORY SOURCE
// =============================================================================

/// Reads ISS documents saved in one directory.
///
/// ```text
/// iss/
///   RU000A0JX0J2.json   securities/<ISIN>.json
///   RU000A105SG2.json
///   currencies.json     currency/markets/index/securities.json
///   zcyc.json           stock/zcyc.json (optional)
/// ```
#[derive(Debug, Clone)]
pub struct IssDirectorySource {
    root: PathBuf,
}

impl IssDirectorySource {
    /// Create a source over `root`.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, TraitError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(TraitError::SourceNotAvailable(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Directory read by this source.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads a document. A missing file is `Ok(None)`.
    fn read(&self, file_name: &str) -> Result<Option<IssDocument>, TraitError> {
        let path = self.root.join(file_name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TraitError::IoError(format!("{}: {e}", path.display()))),
        };
        debug!(path = %path.display(), bytes = bytes.len(), "read ISS document");
        IssDocument::from_slice(&bytes)
            .map(Some)
            .map_err(|e| TraitError::ParseError(format!("{}: {e}", path.display())))
    }
}

impl MarketDataSource for IssDirectorySource {
    fn fetch_instrument(&self, id: &InstrumentId) -> Result<Option<InstrumentRecord>, TraitError> {
        if id.is_empty() || id.as_str().contains(['/', '\\', '.']) {
            return Err(TraitError::InvalidInput(format!("bad instrument id {id:?}")));
        }
        match self.read(&format!("{id}.json"))? {
            Some(doc) => doc.instrument(id),
            None => Ok(None),
        }
    }

    fn fetch_currency_rates(&self) -> Result<Vec<CurrencyRate>, TraitError> {
        let doc = self
            .read(CURRENCIES_FILE)?
            .ok_or_else(|| TraitError::NotFound(self.root.join(CURRENCIES_FILE).display().to_string()))?;
        doc.currency_rates()
    }
}

/// The exchange publishes a zero-coupon curve for rubles only.
impl BenchmarkCurveSource for IssDirectorySource {
    fn benchmark_curve(
        &self,
        currency: &CurrencyCode,
    ) -> Result<Option<BenchmarkCurve>, TraitError> {
        if *currency != CurrencyCode::RUB {
            return Ok(None);
        }
        match self.read(ZERO_CURVE_FILE)? {
            Some(doc) => doc.zero_coupon_curve(*currency).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondfolio_core::types::Date;
    use tempfile::tempdir;

    const SECURITY: &str = r#"{
        "securities": {
            "columns": ["SECID", "BOARDID", "FACEUNIT", "FACEVALUE", "ISIN", "LOTSIZE"],
            "data": [["RU000A105SG2", "TQCB", "CNY", 1000, "RU000A105SG2", 1]]
        },
        "marketdata": {"columns": ["SECID", "LAST"], "data": [["RU000A105SG2", 99.4]]}
    }"#;

    const CURRENCIES: &str = r#"{
        "marketdata": {
            "columns": ["SECID", "TRADEDATE", "LASTVALUE"],
            "data": [["USDFIX", "2025-01-14", 101.68], ["CNYFIX", "2025-01-14", 13.9]]
        }
    }"#;

    fn source() -> (tempfile::TempDir, IssDirectorySource) {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("RU000A105SG2.json"), SECURITY).unwrap();
        std::fs::write(dir.path().join(CURRENCIES_FILE), CURRENCIES).unwrap();
        let source = IssDirectorySource::new(dir.path()).unwrap();
        (dir, source)
    }

    #[test]
    fn test_fetch_instrument() {
        let (_dir, source) = source();
        let record = source
            .fetch_instrument(&InstrumentId::new("RU000A105SG2"))
            .unwrap()
            .unwrap();
        assert_eq!(record.face_currency.as_deref(), Some("CNY"));
        assert_eq!(record.last_price, Some(99.4));

        assert!(source
            .fetch_instrument(&InstrumentId::new("RU000A0JX0J2"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_rejects_path_ids() {
        let (_dir, source) = source();
        let err = source
            .fetch_instrument(&InstrumentId::new("../secrets"))
            .unwrap_err();
        assert!(matches!(err, TraitError::InvalidInput(_)));
    }

    #[test]
    fn test_currency_rates() {
        let (_dir, source) = source();
        let rates = source.fetch_currency_rates().unwrap();
        assert_eq!(rates.len(), 2);

        let cny = rates.iter().find(|r| r.currency == CurrencyCode::CNY).unwrap();
        assert_eq!(cny.rate, 13.9);
        assert_eq!(cny.quote, CurrencyCode::RUB);
        assert_eq!(cny.trade_date, Some(Date::from_ymd(2025, 1, 14).unwrap()));
    }

    #[test]
    fn test_missing_currencies_file() {
        let dir = tempdir().unwrap();
        let source = IssDirectorySource::new(dir.path()).unwrap();
        assert!(matches!(
            source.fetch_currency_rates().unwrap_err(),
            TraitError::NotFound(_)
        ));
    }

    #[test]
    fn test_malformed_document() {
        let (dir, source) = source();
        std::fs::write(dir.path().join("BROKEN.json"), "{not json").unwrap();
        let err = source
            .fetch_instrument(&InstrumentId::new("BROKEN"))
            .unwrap_err();
        assert!(matches!(err, TraitError::ParseError(_)));
    }

    #[test]
    fn test_zero_curve_rub_only() {
        let (dir, source) = source();
        std::fs::write(
            dir.path().join(ZERO_CURVE_FILE),
            r#"{"yearyields": {"columns": ["period", "value"], "data": [[1.0, 18.0], [10.0, 14.0]]}}"#,
        )
        .unwrap();

        let curve = source.benchmark_curve(&CurrencyCode::RUB).unwrap().unwrap();
        assert_eq!(curve.points().len(), 2);
        assert!(source.benchmark_curve(&CurrencyCode::USD).unwrap().is_none());
    }

    #[test]
    fn test_not_a_directory() {
        assert!(IssDirectorySource::new("/nonexistent/iss").is_err());
    }
}
