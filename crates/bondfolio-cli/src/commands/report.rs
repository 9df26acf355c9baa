//! Report command implementation.
//!
//! Values the portfolio from the instrument cache and prints per-currency
//! metrics, the monthly coupon calendar and benchmark comparisons.

use std::path::PathBuf;

use anyhow::Result;
use bondfolio_core::types::Date;
use bondfolio_ext_file::CsvBenchmarkCurveSource;
use bondfolio_ext_file::CsvPortfolioSource;
use bondfolio_portfolio::benchmark::{compare_all, BenchmarkComparison};
use bondfolio_portfolio::prelude::*;
use bondfolio_traits::PortfolioSource;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::commands::{open_store, parse_currency, parse_date, print_diagnostics};
use crate::output::{
    format_amount, format_bps, format_percent, print_header, print_json_value, print_output,
    KeyValue,
};
use crate::settings::Settings;

/// Arguments for the report command.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Portfolio CSV (identifier, lot count)
    #[arg(short, long)]
    pub portfolio: PathBuf,

    /// Instrument cache file
    #[arg(short, long, env = "BONDFOLIO_STORE")]
    pub store: Option<PathBuf>,

    /// Valuation date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub as_of: Option<String>,

    /// Reporting currency. Defaults to the configured base_currency.
    #[arg(short, long)]
    pub base_currency: Option<String>,

    /// Benchmark curves CSV (currency, period, value)
    #[arg(long)]
    pub curves: Option<PathBuf>,

    /// Print only the coupon calendar
    #[arg(long, conflicts_with = "metrics_only")]
    pub calendar_only: bool,

    /// Print only the currency metrics
    #[arg(long)]
    pub metrics_only: bool,
}

/// One row of the currency metrics table.
#[derive(Debug, Serialize, Tabled)]
struct MetricsRow {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Bonds")]
    holdings: usize,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Eff. yield")]
    effective_yield: String,
    #[tabled(rename = "YTM")]
    yield_to_maturity: String,
    #[tabled(rename = "Duration (d)")]
    duration_days: String,
    #[tabled(rename = "Coupon")]
    coupon_percent: String,
    #[tabled(rename = "Years")]
    years_to_maturity: String,
}

impl MetricsRow {
    fn new(m: &CurrencyMetrics, precision: usize) -> Self {
        Self {
            currency: m.currency.to_string(),
            holdings: m.holdings_count,
            share: format_percent(m.total_share * 100.0, precision),
            value: format_amount(m.value_base, precision),
            effective_yield: format_percent(m.weighted_effective_yield, precision),
            yield_to_maturity: format_percent(m.weighted_yield, precision),
            duration_days: format!("{:.0}", m.weighted_duration_days),
            coupon_percent: format_percent(m.weighted_coupon_percent, precision),
            years_to_maturity: format!("{:.2}", m.weighted_years_to_maturity),
        }
    }
}

/// One month of the coupon calendar.
#[derive(Debug, Serialize, Tabled)]
struct CalendarRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// One benchmark comparison.
#[derive(Debug, Serialize, Tabled)]
struct BenchmarkRow {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Years")]
    years: String,
    #[tabled(rename = "Portfolio")]
    portfolio: String,
    #[tabled(rename = "Benchmark")]
    benchmark: String,
    #[tabled(rename = "Spread")]
    spread: String,
}

impl BenchmarkRow {
    fn new(c: &BenchmarkComparison, precision: usize) -> Self {
        let years = if c.within_curve {
            format!("{:.2}", c.years_to_maturity)
        } else {
            format!("{:.2}*", c.years_to_maturity)
        };
        Self {
            currency: c.currency.to_string(),
            years,
            portfolio: format_percent(c.portfolio_ytm, precision),
            benchmark: format_percent(c.benchmark_yield, precision),
            spread: format_bps(c.spread_bp),
        }
    }
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    #[serde(flatten)]
    report: &'a PortfolioReport,
    benchmarks: &'a [BenchmarkComparison],
}

/// Execute the report command.
pub fn execute(args: ReportArgs, format: OutputFormat, settings: &Settings) -> Result<()> {
    let as_of = match args.as_of.as_deref() {
        Some(s) => parse_date(s)?,
        None => Date::today(),
    };
    let base_currency = match args.base_currency.as_deref() {
        Some(s) => parse_currency(s)?,
        None => settings.base_currency,
    };

    let holdings = CsvPortfolioSource::new().load_portfolio(&args.portfolio)?;
    let storage = open_store(args.store, settings)?;

    let config = AnalyticsConfig::new(as_of).with_base_currency(base_currency);
    let report = PortfolioEngine::new(&storage, config).run(&holdings)?;

    let benchmarks = match &args.curves {
        Some(path) => compare_all(&report.currency_metrics, &CsvBenchmarkCurveSource::new(path)?)?,
        None => Vec::new(),
    };

    print_diagnostics(&report.diagnostics);

    let precision = settings.decimal_precision;
    let metrics: Vec<MetricsRow> = report
        .currency_metrics
        .iter()
        .map(|m| MetricsRow::new(m, precision))
        .collect();
    let calendar: Vec<CalendarRow> = report
        .calendar
        .iter()
        .map(|(month, amount)| CalendarRow {
            month: format!("{:04}-{:02}", month.year(), month.month()),
            amount: format_amount(amount, precision),
        })
        .collect();
    let benchmark_rows: Vec<BenchmarkRow> = benchmarks
        .iter()
        .map(|c| BenchmarkRow::new(c, precision))
        .collect();

    match format {
        OutputFormat::Json => {
            if args.calendar_only {
                print_json_value(&report.calendar)?;
            } else if args.metrics_only {
                print_json_value(&report.currency_metrics)?;
            } else {
                print_json_value(&ReportOutput {
                    report: &report,
                    benchmarks: &benchmarks,
                })?;
            }
        }
        OutputFormat::Minimal => {
            println!("{:.prec$}", report.total_value_base, prec = precision);
        }
        OutputFormat::Table | OutputFormat::Csv => {
            let table = format == OutputFormat::Table;
            if !args.calendar_only {
                if table {
                    print_header("Portfolio");
                    let summary = vec![
                        KeyValue::new("As of", report.as_of.to_string()),
                        KeyValue::new("Holdings", report.holdings.len().to_string()),
                        KeyValue::new(
                            format!("Value ({})", report.base_currency),
                            format_amount(report.total_value_base, precision),
                        ),
                    ];
                    print_output(&summary, format)?;
                    print_header("Currency Metrics");
                }
                print_output(&metrics, format)?;
            }
            if !args.metrics_only {
                if table {
                    print_header(&format!("Coupon Calendar ({})", report.base_currency));
                } else if !args.calendar_only {
                    println!();
                }
                print_output(&calendar, format)?;
            }
            if !benchmark_rows.is_empty() && !args.calendar_only && !args.metrics_only {
                if table {
                    print_header("Benchmark");
                } else {
                    println!();
                }
                print_output(&benchmark_rows, format)?;
            }
        }
    }

    Ok(())
}
