//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date format: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Invalid currency code.
    #[error("Invalid currency: {0}. Use a three-letter code such as RUB or USD.")]
    InvalidCurrency(String),

    /// Instrument not in the cache.
    #[error("Instrument {0} is not in the store. Run `bondfolio import` first.")]
    NotCached(String),

    /// Unknown configuration key.
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
