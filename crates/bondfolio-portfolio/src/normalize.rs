//! Record normalization.
//!
//! Turns a raw instrument row into one with parsed dates, a
//! `<column>_delta` days-until column right after each date, and the
//! caller's drop columns removed.
//!
//! ```text
//! ... next_coupon_date ...           (text "2025-02-04")
//! ... next_coupon_date next_coupon_date_delta ...   (date, 20)
//! ```

use std::fmt;

use bondfolio_core::types::{Date, FieldValue, Row};
use bondfolio_traits::records::columns;
use thiserror::Error;
use tracing::debug;

/// The exchange's placeholder for "no date".
pub const NULL_DATE_SENTINEL: &str = "0000-00-00";

/// Failure to normalize one record. The record is dropped; the run goes on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// A designated date column holds something that is not a date.
    #[error("Cannot parse column '{column}' as a date: '{value}'")]
    DateParse {
        /// Column name.
        column: String,
        /// Offending value.
        value: String,
    },

    /// A designated date column is absent from the row.
    #[error("Date column '{column}' is missing")]
    MissingDateColumn {
        /// Column name.
        column: String,
    },
}

impl NormalizeError {
    /// The column that failed.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::DateParse { column, .. } | Self::MissingDateColumn { column } => column,
        }
    }
}

/// A non-fatal normalization finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizeWarning {
    /// A column listed for dropping was not in the row.
    MissingDropColumn {
        /// Column name.
        column: String,
    },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDropColumn { column } => {
                write!(f, "column '{column}' listed for dropping does not exist")
            }
        }
    }
}

/// A normalized row plus the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The normalized row.
    pub row: Row,
    /// Non-fatal findings.
    pub warnings: Vec<NormalizeWarning>,
}

/// Parses date columns, inserts day deltas and drops columns.
///
/// # Example
///
/// ```rust
/// use bondfolio_core::types::{Date, FieldValue, Row};
/// use bondfolio_portfolio::normalize::Normalizer;
///
/// let today = Date::from_ymd(2025, 1, 15).unwrap();
/// let normalizer = Normalizer::new(today)
///     .with_date_columns(["maturity_date"])
///     .with_drop_columns(["secid"]);
///
/// let row: Row = [
///     ("secid", FieldValue::Text("SU26238RMFS4".into())),
///     ("maturity_date", FieldValue::Text("2025-02-14".into())),
/// ]
/// .into_iter()
/// .collect();
///
/// let out = normalizer.normalize(&row).unwrap();
/// assert_eq!(out.row.get("maturity_date_delta"), Some(&FieldValue::Int(30)));
/// assert!(!out.row.contains("secid"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    today: Date,
    date_columns: Vec<String>,
    drop_columns: Vec<String>,
}

impl Normalizer {
    /// Creates a normalizer with the default exchange date and drop columns.
    #[must_use]
    pub fn new(today: Date) -> Self {
        Self {
            today,
            date_columns: columns::DEFAULT_DATE_COLUMNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            drop_columns: columns::DEFAULT_DROP_COLUMNS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Replaces the date columns.
    #[must_use]
    pub fn with_date_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the columns to drop.
    #[must_use]
    pub fn with_drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// The reference date for deltas.
    #[must_use]
    pub fn today(&self) -> Date {
        self.today
    }

    /// Normalizes one row.
    ///
    /// Running it again on its own output changes nothing: dates stay dates
    /// and existing delta columns are overwritten in place.
    pub fn normalize(&self, row: &Row) -> Result<Normalized, NormalizeError> {
        let mut out = row.clone();

        for column in &self.date_columns {
            let pos = out
                .position(column)
                .ok_or_else(|| NormalizeError::MissingDateColumn {
                    column: column.clone(),
                })?;
            let date = match out.get(column) {
                Some(value) => parse_date_cell(column, value)?,
                None => None,
            };
            let delta = date.map(|d| d - self.today);

            out.set(column.as_str(), FieldValue::from(date));
            out.insert(pos + 1, columns::delta_of(column), FieldValue::from(delta));
        }

        let mut warnings = Vec::new();
        for column in &self.drop_columns {
            if out.remove(column).is_none() {
                debug!(column = %column, "drop column not present");
                warnings.push(NormalizeWarning::MissingDropColumn {
                    column: column.clone(),
                });
            }
        }

        Ok(Normalized { row: out, warnings })
    }
}

fn parse_date_cell(column: &str, value: &FieldValue) -> Result<Option<Date>, NormalizeError> {
    let parse_error = || NormalizeError::DateParse {
        column: column.to_string(),
        value: value.to_string(),
    };

    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Date(d) => Ok(Some(*d)),
        FieldValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() || s == NULL_DATE_SENTINEL {
                Ok(None)
            } else {
                Date::parse(s).map(Some).map_err(|_| parse_error())
            }
        }
        FieldValue::Int(_) | FieldValue::Float(_) => Err(parse_error()),
    }
}
