//! Date type for portfolio calculations.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

use crate::error::{CoreError, CoreResult};

/// A calendar date.
///
/// This is a newtype wrapper around `chrono::NaiveDate` with the day and
/// month arithmetic the valuation and calendar code needs.
///
/// # Example
///
/// ```rust
/// use bondfolio_core::types::Date;
///
/// let date = Date::from_ymd(2025, 6, 15).unwrap();
/// assert_eq!(date.start_of_month(), Date::from_ymd(2025, 6, 1).unwrap());
/// assert_eq!(date.next_month_start().unwrap(), Date::from_ymd(2025, 7, 1).unwrap());
/// assert_eq!(Date::from_ymd(2025, 7, 5).unwrap() - date, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Parses an ISO 8601 date (YYYY-MM-DD).
    ///
    /// A trailing time component (`2025-06-15 10:00:00` or
    /// `2025-06-15T10:00:00`) is accepted and ignored.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        let date_part = match trimmed.char_indices().nth(10) {
            Some((idx, ' ' | 'T')) => &trimmed[..idx],
            _ => trimmed,
        };
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map(Date)
            .map_err(|_| CoreError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Returns today's date in local time.
    #[must_use]
    pub fn today() -> Self {
        Date(chrono::Local::now().date_naive())
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Adds a number of days to the date.
    ///
    /// Returns `None` when the result falls outside the supported range.
    #[must_use]
    pub fn checked_add_days(&self, days: i64) -> Option<Self> {
        chrono::Duration::try_days(days)
            .and_then(|d| self.0.checked_add_signed(d))
            .map(Date)
    }

    /// Returns the first day of the month.
    #[must_use]
    pub fn start_of_month(&self) -> Self {
        self.0.with_day(1).map_or(*self, Date)
    }

    /// Returns the first day of the following month.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` past the end of the supported range.
    pub fn next_month_start(&self) -> CoreResult<Self> {
        if self.month() == 12 {
            Self::from_ymd(self.year() + 1, 1, 1)
        } else {
            Self::from_ymd(self.year(), self.month() + 1, 1)
        }
    }

    /// Returns true if both dates fall in the same calendar month.
    #[must_use]
    pub fn same_month(&self, other: &Date) -> bool {
        self.year() == other.year() && self.month() == other.month()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Sub<Date> for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    fn sub(self, other: Date) -> Self::Output {
        (self.0 - other.0).num_days()
    }
}
