//! Error types for portfolio runs.
//!
//! Only run-level failures are errors. Problems with a single instrument are
//! reported as [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use bondfolio_traits::TraitError;
use thiserror::Error;

/// Result type for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

/// Errors that abort a portfolio run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    /// Empty portfolio.
    #[error("Portfolio has no holdings")]
    EmptyPortfolio,

    /// Every holding was dropped before valuation.
    #[error("No holding could be valued ({dropped} dropped, see diagnostics)")]
    NoValuedHoldings {
        /// Number of holdings dropped.
        dropped: usize,
    },

    /// No currency bucket carries a nonzero share.
    #[error("No currency has a nonzero portfolio share ({currencies} checked)")]
    NoNonzeroCurrency {
        /// Number of currency buckets examined.
        currencies: usize,
    },

    /// Malformed portfolio source.
    #[error("Malformed portfolio source: {reason}")]
    Source {
        /// What is wrong with the source.
        reason: String,
    },

    /// Store or data source failure.
    #[error("Data source error: {reason}")]
    DataSource {
        /// The underlying failure.
        reason: String,
    },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch {
        /// The expected currency.
        expected: String,
        /// The actual currency.
        got: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// The reason the configuration is invalid.
        reason: String,
    },
}

impl PortfolioError {
    /// Create a data source error.
    #[must_use]
    pub fn data_source(reason: impl Into<String>) -> Self {
        Self::DataSource {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl From<TraitError> for PortfolioError {
    fn from(err: TraitError) -> Self {
        match err {
            TraitError::Format(reason) => Self::Source { reason },
            other => Self::DataSource {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortfolioError::NoValuedHoldings { dropped: 3 };
        assert!(err.to_string().contains("3 dropped"));

        let err = PortfolioError::data_source("disk full");
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_format_error_is_preserved() {
        let err: PortfolioError = TraitError::Format("expected 2 columns, found 3".into()).into();
        assert_eq!(
            err,
            PortfolioError::Source {
                reason: "expected 2 columns, found 3".into()
            }
        );

        let err: PortfolioError = TraitError::DatabaseError("locked".into()).into();
        assert!(matches!(err, PortfolioError::DataSource { .. }));
    }
}
