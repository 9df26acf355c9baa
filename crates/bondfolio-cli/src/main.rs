//! Bondfolio CLI - Command-line interface for bond portfolio analytics.
//!
//! # Usage
//!
//! ```bash
//! # Refresh the cache from saved exchange documents
//! bondfolio import --dir ./iss --portfolio bonds.csv
//!
//! # Value the portfolio and print metrics and the coupon calendar
//! bondfolio report --portfolio bonds.csv
//!
//! # Compare against benchmark curves
//! bondfolio report --portfolio bonds.csv --curves curves.csv
//!
//! # Look at one cached instrument after normalization
//! bondfolio inspect RU000A0JX0J2
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod output;
mod settings;

use cli::{Cli, Commands};
use settings::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.quiet);

    // Config commands still run when the saved config is invalid
    let settings = match cli.command {
        Commands::Config(_) => Settings::load().unwrap_or_default(),
        _ => Settings::load()?,
    };
    if !settings.use_colors {
        colored::control::set_override(false);
    }

    // Set up output format
    let format = cli.format.unwrap_or(settings.default_format);

    // Execute command
    match cli.command {
        Commands::Import(args) => commands::import::execute(args, format, &settings)?,
        Commands::Report(args) => commands::report::execute(args, format, &settings)?,
        Commands::Inspect(args) => commands::inspect::execute(args, format, &settings)?,
        Commands::Config(args) => commands::config::execute(args, format)?,
    }

    Ok(())
}

/// Logs go to stderr so that stdout stays parseable in every format.
fn init_tracing(quiet: bool) {
    let default = if quiet { "error" } else { "warn,bondfolio=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
