//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::commands::{ConfigArgs, ImportArgs, InspectArgs, ReportArgs};

/// Bondfolio - Bond portfolio valuation and coupon calendar
#[derive(Parser)]
#[command(name = "bondfolio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format [default: table, or the configured default_format]
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Refresh the instrument cache from saved ISS documents
    Import(ImportArgs),

    /// Value the portfolio: currency metrics, coupon calendar, benchmarks
    Report(ReportArgs),

    /// Show one cached instrument after normalization
    Inspect(InspectArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Output format options
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// Minimal output (just the headline value)
    Minimal,
}

impl OutputFormat {
    /// Parses a configured format name.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}
