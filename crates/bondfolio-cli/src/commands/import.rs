//! Import command implementation.
//!
//! Refreshes the instrument cache from a directory of saved ISS documents.

use std::path::PathBuf;

use anyhow::Result;
use bondfolio_ext_file::{CsvPortfolioSource, IssDirectorySource};
use bondfolio_portfolio::refresh::{rate_currencies, refresh_market_data};
use bondfolio_storage::StorageAdapter;
use bondfolio_traits::PortfolioSource;
use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::commands::{open_store, print_diagnostics};
use crate::output::{print_header, print_json_value, print_output, print_success, KeyValue};
use crate::settings::Settings;

/// Arguments for the import command.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Directory of saved ISS documents (<ISIN>.json, currencies.json)
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Portfolio CSV (identifier, lot count)
    #[arg(short, long)]
    pub portfolio: PathBuf,

    /// Instrument cache file
    #[arg(short, long, env = "BONDFOLIO_STORE")]
    pub store: Option<PathBuf>,
}

#[derive(Serialize)]
struct ImportOutput {
    fetched: usize,
    missing: usize,
    failed: usize,
    currencies: Vec<String>,
    cached_instruments: usize,
}

/// Execute the import command.
pub fn execute(args: ImportArgs, format: OutputFormat, settings: &Settings) -> Result<()> {
    let holdings = CsvPortfolioSource::new().load_portfolio(&args.portfolio)?;
    let source = IssDirectorySource::new(&args.dir)?;
    let storage = open_store(args.store, settings)?;

    let summary = refresh_market_data(&source, &storage, &holdings)?;
    print_diagnostics(&summary.diagnostics);

    let currencies: Vec<String> = rate_currencies(&storage.list_currency_rates()?)
        .iter()
        .map(ToString::to_string)
        .collect();
    let output = ImportOutput {
        fetched: summary.fetched,
        missing: summary.missing,
        failed: summary.failed,
        currencies,
        cached_instruments: storage.stats()?.instrument_count,
    };

    match format {
        OutputFormat::Table => {
            print_header("Import");
            let rows = vec![
                KeyValue::new("Fetched", output.fetched.to_string()),
                KeyValue::new("Missing", output.missing.to_string()),
                KeyValue::new("Failed", output.failed.to_string()),
                KeyValue::new("Currencies", output.currencies.join(", ")),
                KeyValue::new("Store", storage.path().display().to_string()),
            ];
            print_output(&rows, format)?;
            print_success(&format!(
                "{} instruments cached",
                output.cached_instruments
            ));
        }
        OutputFormat::Json => print_json_value(&output)?,
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["fetched", "missing", "failed", "currencies"])?;
            wtr.write_record([
                output.fetched.to_string(),
                output.missing.to_string(),
                output.failed.to_string(),
                output.currencies.join(" "),
            ])?;
            wtr.flush()?;
        }
        OutputFormat::Minimal => println!("{}", output.fetched),
    }

    Ok(())
}
