//! Inspect command implementation.
//!
//! Shows one cached instrument as the engine sees it after normalization.

use std::path::PathBuf;

use anyhow::Result;
use bondfolio_core::types::Date;
use bondfolio_portfolio::prelude::*;
use bondfolio_storage::StorageAdapter;
use clap::Args;

use crate::cli::OutputFormat;
use crate::commands::{open_store, parse_date};
use crate::error::CliError;
use crate::output::{print_header, print_json_value, print_output, print_warning, KeyValue};
use crate::settings::Settings;

/// Arguments for the inspect command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Instrument ISIN
    pub isin: String,

    /// Instrument cache file
    #[arg(short, long, env = "BONDFOLIO_STORE")]
    pub store: Option<PathBuf>,

    /// Date the days-until columns are counted from (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Execute the inspect command.
pub fn execute(args: InspectArgs, format: OutputFormat, settings: &Settings) -> Result<()> {
    let as_of = match args.as_of.as_deref() {
        Some(s) => parse_date(s)?,
        None => Date::today(),
    };

    let storage = open_store(args.store, settings)?;
    let isin = InstrumentId::new(args.isin);
    let record = storage
        .read_instrument(isin.as_str())?
        .ok_or_else(|| CliError::NotCached(isin.to_string()))?;

    let engine = PortfolioEngine::new(&storage, AnalyticsConfig::new(as_of));
    let normalized = engine.normalize_record(&record)?;
    for warning in &normalized.warnings {
        print_warning(&warning.to_string());
    }

    match format {
        OutputFormat::Json => print_json_value(&normalized.row)?,
        OutputFormat::Minimal => println!("{}", isin),
        OutputFormat::Table | OutputFormat::Csv => {
            let rows: Vec<KeyValue> = normalized
                .row
                .iter()
                .map(|(column, value)| KeyValue::new(column, value.to_string()))
                .collect();
            if format == OutputFormat::Table {
                print_header(&isin.to_string());
            }
            print_output(&rows, format)?;
        }
    }

    Ok(())
}
