//! CSV portfolio source.

use std::io::Read;
use std::path::Path;

use bondfolio_traits::error::TraitError;
use bondfolio_traits::{Holding, PortfolioSource};
use tracing::debug;

// =============================================================================
// CSV PORTFOLIO SOURCE
// =============================================================================

/// Reads holdings from a two-column CSV file.
///
/// ```text
/// ISIN,Lots
/// RU000A0JX0J2,10
/// RU000A105SG2,3
/// ```
///
/// The header names are free; the shape is not. Exactly two columns are
/// required and every lot count must be a positive integer (`10` and
/// `10.0` are accepted, `10.5` and `0` are not).
#[derive(Debug, Clone)]
pub struct CsvPortfolioSource {
    delimiter: u8,
}

impl Default for CsvPortfolioSource {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvPortfolioSource {
    /// Creates a comma-delimited source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses another field delimiter (`;` for spreadsheet exports).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parses holdings from any reader.
    pub fn read_holdings<R: Read>(&self, input: R) -> Result<Vec<Holding>, TraitError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|e| TraitError::Format(e.to_string()))?;
        if headers.len() != 2 {
            return Err(TraitError::Format(format!(
                "portfolio needs exactly two columns (identifier, lot count), found {}",
                headers.len()
            )));
        }

        let mut holdings = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let line = i + 2;
            let record = result.map_err(|e| TraitError::Format(e.to_string()))?;
            if record.len() != 2 {
                return Err(TraitError::Format(format!(
                    "line {line}: expected 2 fields, found {}",
                    record.len()
                )));
            }

            let id = &record[0];
            if id.is_empty() {
                return Err(TraitError::Format(format!("line {line}: empty identifier")));
            }
            let lot_count = parse_lot_count(&record[1])
                .map_err(|reason| TraitError::Format(format!("line {line}: {reason}")))?;
            holdings.push(Holding::new(id, lot_count));
        }

        debug!(holdings = holdings.len(), "portfolio loaded");
        Ok(holdings)
    }
}

impl PortfolioSource for CsvPortfolioSource {
    fn load_portfolio(&self, path: &Path) -> Result<Vec<Holding>, TraitError> {
        let file = std::fs::File::open(path)
            .map_err(|e| TraitError::IoError(format!("{}: {e}", path.display())))?;
        self.read_holdings(file)
    }
}

/// Parses a positive whole lot count. `10` and `10.0` are both accepted.
fn parse_lot_count(cell: &str) -> Result<i64, String> {
    let count = match cell.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let value: f64 = cell
                .parse()
                .map_err(|_| format!("lot count {cell:?} is not a number"))?;
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(format!("lot count {cell} is not integral"));
            }
            if value.abs() >= i64::MAX as f64 {
                return Err(format!("lot count {cell} is out of range"));
            }
            value as i64
        }
    };
    if count <= 0 {
        return Err(format!("lot count {cell} must be positive"));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Result<Vec<Holding>, TraitError> {
        CsvPortfolioSource::new().read_holdings(input.as_bytes())
    }

    #[test]
    fn test_two_columns() {
        let holdings = read("ISIN,Lots\nRU000A0JX0J2,10\nRU000A105SG2, 3.0\n").unwrap();
        assert_eq!(
            holdings,
            vec![
                Holding::new("RU000A0JX0J2", 10),
                Holding::new("RU000A105SG2", 3),
            ]
        );
    }

    #[test]
    fn test_fractional_lots_rejected() {
        let err = read("ISIN,Lots\nRU000A0JX0J2,10.5\n").unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_non_positive_lots_rejected() {
        for cell in ["0", "-3", "-2.0", "0.0"] {
            let err = read(&format!("ISIN,Lots\nRU000A0JX0J2,1\nRU000A105SG2,{cell}\n")).unwrap_err();
            assert!(err.is_format(), "{cell}");
            assert!(err.to_string().contains("line 3"), "{cell}");
            assert!(err.to_string().contains("must be positive"), "{cell}");
        }
    }

    #[test]
    fn test_wrong_column_count() {
        assert!(read("ISIN\nRU000A0JX0J2\n").unwrap_err().is_format());
        assert!(read("ISIN,Lots,Price\nRU000A0JX0J2,1,98\n")
            .unwrap_err()
            .is_format());
        assert!(read("ISIN,Lots\nRU000A0JX0J2,1,98\n")
            .unwrap_err()
            .is_format());
    }

    #[test]
    fn test_not_a_number() {
        let err = read("ISIN,Lots\nRU000A0JX0J2,ten\n").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_semicolon_delimiter() {
        let holdings = CsvPortfolioSource::new()
            .with_delimiter(b';')
            .read_holdings("isin;lots\nRU000A0JX0J2;7\n".as_bytes())
            .unwrap();
        assert_eq!(holdings, vec![Holding::new("RU000A0JX0J2", 7)]);
    }

    #[test]
    fn test_header_only() {
        assert!(read("ISIN,Lots\n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = CsvPortfolioSource::new()
            .load_portfolio(Path::new("/nonexistent/bonds.csv"))
            .unwrap_err();
        assert!(matches!(err, TraitError::IoError(_)));
    }
}
