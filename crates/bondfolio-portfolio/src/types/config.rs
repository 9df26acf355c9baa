//! Configuration for a portfolio run.

use bondfolio_core::types::{CurrencyCode, Date};
use bondfolio_traits::records::columns;
use serde::{Deserialize, Serialize};

use crate::normalize::Normalizer;

/// Configuration for a portfolio run.
///
/// Controls the valuation date, base currency, normalization columns and
/// parallelism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Valuation date ("today") for all days-until calculations.
    pub as_of: Date,

    /// Reporting currency. Its FX rate is 1.0 without a lookup.
    pub base_currency: CurrencyCode,

    /// Decimal places used when deciding whether a currency bucket's total
    /// share is zero.
    pub share_precision: u32,

    /// Days per year for converting weighted maturity to years.
    pub days_per_year: f64,

    /// Columns parsed as dates, each followed by a `<column>_delta` column.
    pub date_columns: Vec<String>,

    /// Columns removed after date parsing.
    pub drop_columns: Vec<String>,

    /// Enable parallel processing (requires 'parallel' feature).
    pub parallel: bool,

    /// Minimum holdings count to trigger parallel processing.
    /// Below this threshold, sequential is faster due to thread overhead.
    pub parallel_threshold: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self::new(Date::today())
    }
}

impl AnalyticsConfig {
    /// Creates a config valued at `as_of` with default settings.
    #[must_use]
    pub fn new(as_of: Date) -> Self {
        Self {
            as_of,
            base_currency: CurrencyCode::RUB,
            share_precision: 5,
            days_per_year: 365.0,
            date_columns: columns::DEFAULT_DATE_COLUMNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            drop_columns: columns::DEFAULT_DROP_COLUMNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            parallel: true,
            parallel_threshold: 100,
        }
    }

    /// Creates a config that always uses sequential processing.
    #[must_use]
    pub fn sequential(as_of: Date) -> Self {
        Self {
            parallel: false,
            ..Self::new(as_of)
        }
    }

    /// Sets the valuation date.
    #[must_use]
    pub fn with_as_of(mut self, as_of: Date) -> Self {
        self.as_of = as_of;
        self
    }

    /// Sets the base currency.
    #[must_use]
    pub fn with_base_currency(mut self, currency: CurrencyCode) -> Self {
        self.base_currency = currency;
        self
    }

    /// Sets the share rounding precision.
    #[must_use]
    pub fn with_share_precision(mut self, precision: u32) -> Self {
        self.share_precision = precision;
        self
    }

    /// Sets the days-per-year divisor.
    #[must_use]
    pub fn with_days_per_year(mut self, days: f64) -> Self {
        self.days_per_year = days;
        self
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

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the threshold for parallel processing.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Returns true if parallel processing should be used for the given count.
    #[must_use]
    pub fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }

    /// Builds the record normalizer for this configuration.
    #[must_use]
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.as_of)
            .with_date_columns(self.date_columns.iter().cloned())
            .with_drop_columns(self.drop_columns.iter().cloned())
    }

    /// Rounds a share at the configured precision.
    #[must_use]
    pub fn round_share(&self, share: f64) -> f64 {
        let factor = 10f64.powi(self.share_precision.min(15) as i32);
        (share * factor).round() / factor
    }
}
