//! Monthly coupon and principal calendar.
//!
//! Each holding walks forward from its next coupon date in steps of its
//! coupon period until the portfolio's last maturity:
//!
//! ```text
//! cursor = next_coupon_date
//! while cursor <= end_date:
//!     calendar[month(cursor)] += coupon * fx * lots
//!     if month(cursor) == month(maturity):
//!         calendar[month(cursor)] += face * lot_size * fx * lots
//!     cursor += coupon_period_days
//! ```
//!
//! Principal is only added on a coupon step that lands in the maturity
//! month. A bond whose maturity month has no coupon step never shows its
//! redemption.

use std::collections::BTreeMap;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::debug;

use bondfolio_core::types::Date;

use crate::parallel::maybe_parallel_fold;
use crate::types::{AnalyticsConfig, EnrichedHolding};

/// Cash flow per calendar month, in base currency.
///
/// Months are keyed by their first day and form a contiguous range with no
/// gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyCalendar {
    months: BTreeMap<Date, f64>,
}

impl MonthlyCalendar {
    /// Creates a zero-filled calendar from the month of `start` through the
    /// month of `end`, inclusive. Empty if `end` is before `start`'s month.
    #[must_use]
    pub fn zero_filled(start: Date, end: Date) -> Self {
        let mut months = BTreeMap::new();
        let mut current = start.start_of_month();
        while current <= end {
            months.insert(current, 0.0);
            match current.next_month_start() {
                Ok(next) => current = next,
                Err(_) => break,
            }
        }
        Self { months }
    }

    /// Adds `amount` to the month containing `date`.
    ///
    /// Returns false, leaving the calendar unchanged, when the month is
    /// outside the calendar.
    pub fn add(&mut self, date: Date, amount: f64) -> bool {
        match self.months.get_mut(&date.start_of_month()) {
            Some(total) => {
                *total += amount;
                true
            }
            None => false,
        }
    }

    /// Adds another calendar month by month. Months missing here are ignored.
    pub fn merge(&mut self, other: &MonthlyCalendar) {
        for (month, amount) in &other.months {
            if let Some(total) = self.months.get_mut(month) {
                *total += amount;
            }
        }
    }

    /// Amount for the month containing `date`.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.months.get(&date.start_of_month()).copied()
    }

    /// Number of months.
    #[must_use]
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Returns true if the calendar has no months.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// First month.
    #[must_use]
    pub fn first_month(&self) -> Option<Date> {
        self.months.keys().next().copied()
    }

    /// Last month.
    #[must_use]
    pub fn last_month(&self) -> Option<Date> {
        self.months.keys().next_back().copied()
    }

    /// Sum over all months.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.months.values().sum()
    }

    /// Iterates months in order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.months.iter().map(|(d, v)| (*d, *v))
    }
}

#[derive(Serialize)]
struct MonthEntry {
    month: Date,
    amount: f64,
}

impl Serialize for MonthlyCalendar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.months.len()))?;
        for (month, amount) in self.iter() {
            seq.serialize_element(&MonthEntry { month, amount })?;
        }
        seq.end()
    }
}

/// Adds one holding's coupon and principal flows.
pub fn add_holding_flows(calendar: &mut MonthlyCalendar, holding: &EnrichedHolding, end_date: Date) {
    let inst = &holding.instrument;
    if inst.coupon_period_days <= 0 {
        return;
    }
    let lots = holding.lot_count as f64;
    let fx = holding.fx_rate_to_base;
    let coupon = inst.coupon_value * fx * lots;
    let principal = inst.face_value * inst.lot_size as f64 * fx * lots;

    // A step past the supported date range ends the walk
    let mut cursor = Some(inst.next_coupon_date);
    while let Some(date) = cursor.filter(|d| *d <= end_date) {
        calendar.add(date, coupon);
        if date.same_month(&inst.maturity_date) {
            calendar.add(date, principal);
        }
        cursor = date.checked_add_days(inst.coupon_period_days);
    }
}

/// Projects monthly flows of all holdings from the month of `as_of` through
/// the latest maturity.
#[must_use]
pub fn project_calendar(holdings: &[EnrichedHolding], config: &AnalyticsConfig) -> MonthlyCalendar {
    let Some(end_date) = holdings.iter().map(|h| h.instrument.maturity_date).max() else {
        return MonthlyCalendar::default();
    };
    let template = MonthlyCalendar::zero_filled(config.as_of, end_date);

    let calendar = maybe_parallel_fold(
        holdings,
        config,
        template,
        |mut acc, holding| {
            add_holding_flows(&mut acc, holding, end_date);
            acc
        },
        |mut a, b| {
            a.merge(&b);
            a
        },
    );

    debug!(
        months = calendar.len(),
        end = %end_date,
        total = calendar.total(),
        "projected calendar"
    );
    calendar
}
