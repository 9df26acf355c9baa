//! Ordered tabular rows.
//!
//! A [`Row`] is one record of a table: named columns in a fixed order, each
//! holding a [`FieldValue`]. Instrument records are turned into rows before
//! normalization so that date parsing and column dropping work on column
//! names chosen by the caller.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

use super::Date;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Missing value.
    Null,
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Parsed calendar date.
    Date(Date),
    /// Unparsed text.
    Text(String),
}

impl FieldValue {
    /// Returns true for [`FieldValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as a float, widening integers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an integer. Floats qualify only when integral.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Returns the value as text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a date.
    #[must_use]
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Date(_) => "date",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Float)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Int)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<Option<Date>> for FieldValue {
    fn from(value: Option<Date>) -> Self {
        value.map_or(Self::Null, Self::Date)
    }
}

/// An ordered set of named columns.
///
/// Column names are unique; [`Row::set`] replaces an existing column in place.
///
/// # Example
///
/// ```rust
/// use bondfolio_core::types::{FieldValue, Row};
///
/// let mut row = Row::new();
/// row.set("isin", FieldValue::Text("RU000A0JX0J2".into()));
/// row.set("face_value", FieldValue::Float(1000.0));
/// row.insert(1, "lot_size", FieldValue::Int(1));
///
/// let names: Vec<_> = row.columns().collect();
/// assert_eq!(names, ["isin", "lot_size", "face_value"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, FieldValue)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns the index of a column.
    #[must_use]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.cells.iter().position(|(name, _)| name == column)
    }

    /// Returns true if the column exists.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Sets a column, replacing it in place or appending it at the end.
    pub fn set(&mut self, column: impl Into<String>, value: FieldValue) {
        let column = column.into();
        match self.position(&column) {
            Some(idx) => self.cells[idx].1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Inserts a column at `index`, removing any existing column of the same
    /// name first. The index is clamped to the row length.
    pub fn insert(&mut self, index: usize, column: impl Into<String>, value: FieldValue) {
        let column = column.into();
        let mut index = index;
        if let Some(existing) = self.position(&column) {
            self.cells.remove(existing);
            if existing < index {
                index -= 1;
            }
        }
        let index = index.min(self.cells.len());
        self.cells.insert(index, (column, value));
    }

    /// Removes a column, returning its value.
    pub fn remove(&mut self, column: &str) -> Option<FieldValue> {
        self.position(column).map(|idx| self.cells.remove(idx).1)
    }

    /// Iterates over column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<S: Into<String>> FromIterator<(S, FieldValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, FieldValue)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.set(name, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
