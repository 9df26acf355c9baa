//! CLI command implementations.

pub mod config;
pub mod import;
pub mod inspect;
pub mod report;

// Re-export submodules for convenience
pub use config::ConfigArgs;
pub use import::ImportArgs;
pub use inspect::InspectArgs;
pub use report::ReportArgs;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bondfolio_core::types::{CurrencyCode, Date};
use bondfolio_portfolio::diagnostics::Diagnostics;
use bondfolio_storage::RedbStorage;

use crate::error::{CliError, CliResult};
use crate::output::print_warning;
use crate::settings::Settings;

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> CliResult<Date> {
    Date::parse(s).map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Parses a currency code.
pub fn parse_currency(s: &str) -> CliResult<CurrencyCode> {
    CurrencyCode::new(s).map_err(|_| CliError::InvalidCurrency(s.to_string()))
}

/// Opens the instrument cache at `--store`, or the configured path.
pub fn open_store(store: Option<PathBuf>, settings: &Settings) -> Result<RedbStorage> {
    let path = store.unwrap_or_else(|| settings.store_path.clone());
    RedbStorage::open(&path).with_context(|| format!("opening store {}", path.display()))
}

/// Prints diagnostics to stderr as warnings.
pub fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        print_warning(&diagnostic.to_string());
    }
}
