//! Decoder for Moscow Exchange ISS JSON documents.
//!
//! An ISS document is a map of named blocks, each a table:
//!
//! ```json
//! {
//!   "securities": {"columns": ["SECID", "FACEVALUE"], "data": [["RU000A0JX0J2", 1000]]},
//!   "marketdata": {"columns": ["SECID", "LAST"], "data": [["RU000A0JX0J2", 98.1]]}
//! }
//! ```
//!
//! Cells are looked up by column name, never by position, so the decoder
//! keeps working when the exchange adds or reorders columns.

use std::collections::HashMap;

use bondfolio_core::types::{CurrencyCode, Date};
use bondfolio_traits::error::TraitError;
use bondfolio_traits::{BenchmarkCurve, CurrencyRate, CurvePoint, InstrumentId, InstrumentRecord};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Face unit the exchange reports for rubles.
const ISS_RUBLE: &str = "SUR";

/// Suffix of the central bank fixing tickers in the currency index.
const FIXING_SUFFIX: &str = "FIX";

// =============================================================================
// BLOCKS
// =============================================================================

/// One ISS table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssBlock {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

impl IssBlock {
    /// Creates a block from column names and rows.
    pub fn new(columns: Vec<String>, data: Vec<Vec<Value>>) -> Self {
        Self { columns, data }
    }

    /// Position of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the block has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row at `index`.
    pub fn row(&self, index: usize) -> Option<IssRow<'_>> {
        self.data.get(index).map(|cells| IssRow { block: self, cells })
    }

    /// All rows in order.
    pub fn rows(&self) -> impl Iterator<Item = IssRow<'_>> {
        self.data.iter().map(move |cells| IssRow { block: self, cells })
    }
}

/// A row of an [`IssBlock`] with by-name cell access.
///
/// A cell that is JSON `null`, or a column the block does not have, reads
/// as absent.
#[derive(Debug, Clone, Copy)]
pub struct IssRow<'a> {
    block: &'a IssBlock,
    cells: &'a [Value],
}

impl<'a> IssRow<'a> {
    /// Raw cell.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.block.column_index(column)?;
        self.cells.get(idx).filter(|v| !v.is_null())
    }

    /// Text cell. Numbers are rendered as text.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Numeric cell. Numeric strings are accepted.
    pub fn float(&self, column: &str) -> Option<f64> {
        match self.get(column)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Integral cell. `10.0` reads as 10; `10.5` reads as absent.
    pub fn int(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// A decoded ISS document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct IssDocument {
    blocks: HashMap<String, IssBlock>,
}

impl IssDocument {
    /// Parses a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, TraitError> {
        serde_json::from_str(json).map_err(|e| TraitError::ParseError(e.to_string()))
    }

    /// Parses a document from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TraitError> {
        serde_json::from_slice(bytes).map_err(|e| TraitError::ParseError(e.to_string()))
    }

    /// Adds or replaces a block.
    pub fn with_block(mut self, name: impl Into<String>, block: IssBlock) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    /// Block by name.
    pub fn block(&self, name: &str) -> Option<&IssBlock> {
        self.blocks.get(name)
    }

    fn require(&self, name: &str) -> Result<&IssBlock, TraitError> {
        self.block(name)
            .ok_or_else(|| TraitError::ParseError(format!("ISS document has no {name:?} block")))
    }

    /// Decodes a security document
    /// (`engines/stock/markets/bonds/securities/<ISIN>.json`).
    ///
    /// Reads the first row of the `securities`, `marketdata` and
    /// `marketdata_yields` blocks. The market blocks may be missing or
    /// empty for bonds that do not trade; their fields are then absent.
    ///
    /// Returns `Ok(None)` when the `securities` block has no rows, which is
    /// how the exchange answers for an unknown identifier.
    pub fn instrument(&self, requested: &InstrumentId) -> Result<Option<InstrumentRecord>, TraitError> {
        let Some(sec) = self.require("securities")?.row(0) else {
            return Ok(None);
        };

        let id = sec
            .text("ISIN")
            .map(InstrumentId::new)
            .unwrap_or_else(|| requested.clone());
        if &id != requested {
            warn!(requested = %requested, found = %id, "ISS document is for another instrument");
        }

        let mut record = InstrumentRecord {
            secid: sec.text("SECID"),
            trading_mode: sec.text("BOARDID"),
            name: sec.text("SECNAME"),
            face_value: sec.float("FACEVALUE"),
            lot_size: sec.int("LOTSIZE"),
            face_currency: sec.text("FACEUNIT").map(|unit| face_unit(&unit)),
            coupon_value: sec.float("COUPONVALUE"),
            coupon_percent: sec.float("COUPONPERCENT"),
            coupon_period_days: sec.int("COUPONPERIOD"),
            next_coupon_date: sec.text("NEXTCOUPON"),
            maturity_date: sec.text("MATDATE"),
            offer_date: sec.text("OFFERDATE"),
            issue_size: sec.float("ISSUESIZE"),
            status: sec.text("STATUS"),
            ..InstrumentRecord::new(id)
        };

        match self.block("marketdata").and_then(|b| b.row(0)) {
            Some(md) => {
                record.last_price = md.float("LAST");
                record.market_price = md.float("MARKETPRICE");
                record.trade_value = md.float("VALUE");
                record.yield_to_maturity = md.float("YIELD");
                record.trade_value_usd = md.float("VALUE_USD");
                record.duration_days = md.float("DURATION");
                record.yield_to_offer = md.float("YIELDTOOFFER");
            }
            None => debug!(instrument = %record.instrument_id, "no marketdata row"),
        }

        match self.block("marketdata_yields").and_then(|b| b.row(0)) {
            Some(y) => {
                record.yield_calc_date = y.text("YIELDDATE");
                record.yield_calc_event_type = y.text("YIELDDATETYPE");
                record.effective_yield = y.float("EFFECTIVEYIELD");
                record.z_spread_bp = y.float("ZSPREADBP");
                record.g_spread_bp = y.float("GSPREADBP");
            }
            None => debug!(instrument = %record.instrument_id, "no marketdata_yields row"),
        }

        Ok(Some(record))
    }

    /// Decodes the currency index document
    /// (`engines/currency/markets/index/securities.json`).
    ///
    /// Only fixing tickers (`USDFIX`, `CNYFIX`, ...) are read; the ticker
    /// prefix is the currency and every fixing is quoted in rubles. Rows
    /// without a positive value are skipped.
    pub fn currency_rates(&self) -> Result<Vec<CurrencyRate>, TraitError> {
        let marketdata = self.require("marketdata")?;

        let mut rates = Vec::new();
        for row in marketdata.rows() {
            let Some(secid) = row.text("SECID") else {
                continue;
            };
            let Some(prefix) = secid.strip_suffix(FIXING_SUFFIX) else {
                continue;
            };
            let Ok(currency) = CurrencyCode::new(prefix) else {
                continue;
            };
            let Some(rate) = row.float("LASTVALUE").filter(|r| *r > 0.0) else {
                debug!(%secid, "fixing has no value");
                continue;
            };

            let mut entry = CurrencyRate::new(currency, CurrencyCode::RUB, rate);
            if let Some(date) = row.text("TRADEDATE").and_then(|d| Date::parse(&d).ok()) {
                entry = entry.with_trade_date(date);
            }
            rates.push(entry);
        }

        rates.sort_by_key(|r| r.currency);
        rates.dedup_by_key(|r| r.currency);
        Ok(rates)
    }

    /// Decodes the zero-coupon yield curve document
    /// (`engines/stock/zcyc.json`), block `yearyields` with columns
    /// `period` (years) and `value` (percent).
    pub fn zero_coupon_curve(&self, currency: CurrencyCode) -> Result<BenchmarkCurve, TraitError> {
        let points: Vec<CurvePoint> = self
            .require("yearyields")?
            .rows()
            .filter_map(|row| Some(CurvePoint::new(row.float("period")?, row.float("value")?)))
            .collect();
        BenchmarkCurve::new(currency, points)
    }
}

/// Maps an ISS face unit to an ISO currency code string.
fn face_unit(unit: &str) -> String {
    if unit.eq_ignore_ascii_case(ISS_RUBLE) {
        CurrencyCode::RUB.to_string()
    } else {
        unit.to_string()
    }
}
