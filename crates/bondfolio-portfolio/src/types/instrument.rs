//! Typed view of a normalized instrument row.

use bondfolio_core::types::{CurrencyCode, Date, FieldValue, Row};
use bondfolio_traits::records::columns;
use bondfolio_traits::InstrumentId;
use serde::Serialize;
use thiserror::Error;

/// Failure to extract one field from a normalized row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Required field absent or null.
    #[error("Required field '{field}' is missing")]
    Missing {
        /// Field name.
        field: String,
    },

    /// Field present with the wrong type.
    #[error("Field '{field}' should be {expected}, found {found}")]
    WrongType {
        /// Field name.
        field: String,
        /// Expected kind.
        expected: &'static str,
        /// Actual kind.
        found: &'static str,
    },

    /// Field present but unusable.
    #[error("Field '{field}' is invalid: {reason}")]
    Invalid {
        /// Field name.
        field: String,
        /// What is wrong.
        reason: String,
    },
}

impl FieldError {
    /// The field that failed.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field }
            | Self::WrongType { field, .. }
            | Self::Invalid { field, .. } => field,
        }
    }
}

/// An instrument with every field the engine relies on checked and typed.
///
/// Built from the output of the [`Normalizer`](crate::normalize::Normalizer),
/// so date fields come with their day deltas already computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedInstrument {
    /// Instrument identifier (ISIN).
    pub instrument_id: InstrumentId,
    /// Short name.
    pub name: Option<String>,
    /// Face value per bond, in face currency.
    pub face_value: f64,
    /// Bonds per lot.
    pub lot_size: i64,
    /// Face currency.
    pub face_currency: CurrencyCode,
    /// Next coupon amount per bond, in face currency.
    pub coupon_value: f64,
    /// Annual coupon rate in percent.
    pub coupon_percent: Option<f64>,
    /// Days between coupons.
    pub coupon_period_days: i64,
    /// Next coupon date.
    pub next_coupon_date: Date,
    /// Days from the valuation date to the next coupon.
    pub days_to_next_coupon: i64,
    /// Maturity date.
    pub maturity_date: Date,
    /// Days from the valuation date to maturity.
    pub days_to_maturity: i64,
    /// Offer (put/call) date, if any.
    pub offer_date: Option<Date>,
    /// Last trade price, percent of face.
    pub last_price: Option<f64>,
    /// Market price, percent of face.
    pub market_price: Option<f64>,
    /// Effective yield to maturity, percent.
    pub effective_yield: Option<f64>,
    /// Quoted yield, percent.
    pub yield_to_maturity: Option<f64>,
    /// Duration in days.
    pub duration_days: Option<f64>,
    /// Yield to offer, percent.
    pub yield_to_offer: Option<f64>,
    /// Z-spread in basis points.
    pub z_spread_bp: Option<f64>,
    /// G-spread in basis points.
    pub g_spread_bp: Option<f64>,
    /// Trading status.
    pub status: Option<String>,
}

/// Longest coupon period accepted, in days (a century).
pub const MAX_COUPON_PERIOD_DAYS: i64 = 36_525;

impl NormalizedInstrument {
    /// Extracts a typed instrument from a normalized row.
    ///
    /// Stops at the first required field that is missing or malformed.
    /// Optional fields that are present with the wrong type are errors too.
    pub fn from_row(id: &InstrumentId, row: &Row) -> Result<Self, FieldError> {
        let face_currency = required_text(row, columns::FACE_CURRENCY)?;
        let face_currency =
            CurrencyCode::new(face_currency).map_err(|e| FieldError::Invalid {
                field: columns::FACE_CURRENCY.to_string(),
                reason: e.to_string(),
            })?;

        let last_price = optional_f64(row, columns::LAST_PRICE)?;
        let market_price = optional_f64(row, columns::MARKET_PRICE)?;
        if last_price.is_none() && market_price.is_none() {
            return Err(FieldError::Missing {
                field: format!("{} or {}", columns::LAST_PRICE, columns::MARKET_PRICE),
            });
        }

        let instrument = Self {
            instrument_id: id.clone(),
            name: optional_text(row, columns::NAME)?,
            face_value: required_f64(row, columns::FACE_VALUE)?,
            lot_size: required_i64(row, columns::LOT_SIZE)?,
            face_currency,
            coupon_value: required_f64(row, columns::COUPON_VALUE)?,
            coupon_percent: optional_f64(row, columns::COUPON_PERCENT)?,
            coupon_period_days: required_i64(row, columns::COUPON_PERIOD_DAYS)?,
            next_coupon_date: required_date(row, columns::NEXT_COUPON_DATE)?,
            days_to_next_coupon: required_i64(row, &columns::delta_of(columns::NEXT_COUPON_DATE))?,
            maturity_date: required_date(row, columns::MATURITY_DATE)?,
            days_to_maturity: required_i64(row, &columns::delta_of(columns::MATURITY_DATE))?,
            offer_date: optional_date(row, columns::OFFER_DATE)?,
            last_price,
            market_price,
            effective_yield: optional_f64(row, columns::EFFECTIVE_YIELD)?,
            yield_to_maturity: optional_f64(row, columns::YIELD_TO_MATURITY)?,
            duration_days: optional_f64(row, columns::DURATION_DAYS)?,
            yield_to_offer: optional_f64(row, columns::YIELD_TO_OFFER)?,
            z_spread_bp: optional_f64(row, columns::Z_SPREAD_BP)?,
            g_spread_bp: optional_f64(row, columns::G_SPREAD_BP)?,
            status: optional_text(row, columns::STATUS)?,
        };

        // Zero and negative periods pass through to the valuation guard
        if instrument.coupon_period_days > MAX_COUPON_PERIOD_DAYS {
            return Err(FieldError::Invalid {
                field: columns::COUPON_PERIOD_DAYS.to_string(),
                reason: format!(
                    "{} days exceeds {MAX_COUPON_PERIOD_DAYS}",
                    instrument.coupon_period_days
                ),
            });
        }
        Ok(instrument)
    }

    /// Price used for valuation: last trade, else market price.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.last_price.or(self.market_price).unwrap_or(0.0)
    }
}

fn present<'a>(row: &'a Row, field: &str) -> Option<&'a FieldValue> {
    row.get(field).filter(|v| !v.is_null())
}

fn missing(field: &str) -> FieldError {
    FieldError::Missing {
        field: field.to_string(),
    }
}

fn wrong_type(field: &str, expected: &'static str, found: &FieldValue) -> FieldError {
    FieldError::WrongType {
        field: field.to_string(),
        expected,
        found: found.kind(),
    }
}

fn optional_f64(row: &Row, field: &str) -> Result<Option<f64>, FieldError> {
    match present(row, field) {
        None => Ok(None),
        Some(v) => match v.as_f64() {
            Some(x) if x.is_finite() => Ok(Some(x)),
            Some(_) => Err(FieldError::Invalid {
                field: field.to_string(),
                reason: "not a finite number".into(),
            }),
            None => Err(wrong_type(field, "number", v)),
        },
    }
}

fn required_f64(row: &Row, field: &str) -> Result<f64, FieldError> {
    optional_f64(row, field)?.ok_or_else(|| missing(field))
}

fn required_i64(row: &Row, field: &str) -> Result<i64, FieldError> {
    let v = present(row, field).ok_or_else(|| missing(field))?;
    v.as_i64().ok_or_else(|| wrong_type(field, "integer", v))
}

fn optional_text(row: &Row, field: &str) -> Result<Option<String>, FieldError> {
    match present(row, field) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| wrong_type(field, "text", v)),
    }
}

fn required_text<'a>(row: &'a Row, field: &str) -> Result<&'a str, FieldError> {
    let v = present(row, field).ok_or_else(|| missing(field))?;
    v.as_str().ok_or_else(|| wrong_type(field, "text", v))
}

fn optional_date(row: &Row, field: &str) -> Result<Option<Date>, FieldError> {
    match present(row, field) {
        None => Ok(None),
        Some(v) => v
            .as_date()
            .map(Some)
            .ok_or_else(|| wrong_type(field, "date", v)),
    }
}

fn required_date(row: &Row, field: &str) -> Result<Date, FieldError> {
    optional_date(row, field)?.ok_or_else(|| missing(field))
}
