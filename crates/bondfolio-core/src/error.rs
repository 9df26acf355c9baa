//! Error types for the Bondfolio core types.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The main error type for core type construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Currency code is not three ASCII letters.
    #[error("Invalid currency code: '{code}'")]
    InvalidCurrency {
        /// The rejected code.
        code: String,
    },

    /// A field value has the wrong shape.
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Description of what's invalid.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid currency error.
    #[must_use]
    pub fn invalid_currency(code: impl Into<String>) -> Self {
        Self::InvalidCurrency { code: code.into() }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_date("2025-02-30");
        assert_eq!(err.to_string(), "Invalid date: 2025-02-30");

        let err = CoreError::invalid_currency("US");
        assert_eq!(err.to_string(), "Invalid currency code: 'US'");
    }
}
