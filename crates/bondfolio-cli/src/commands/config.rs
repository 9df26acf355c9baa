//! Config command implementation.
//!
//! Reads and edits the settings file described in [`crate::settings`].

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::output::{print_header, print_info, print_json_value, print_output, print_success};
use crate::settings::{config_path, ConfigFile, ConfigKey};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show every setting and where its value comes from
    Show,

    /// Print one setting
    Get {
        /// Setting name or alias (e.g. `currency`)
        key: String,
    },

    /// Validate and save one setting
    Set {
        /// Setting name or alias
        key: String,

        /// New value
        value: String,
    },

    /// Describe the available settings
    List,

    /// Drop saved values so defaults apply again
    Reset {
        /// Reset every setting
        #[arg(long, conflicts_with = "key")]
        all: bool,

        /// Setting to reset
        #[arg(required_unless_present = "all")]
        key: Option<String>,
    },

    /// Print the settings file location
    Path,
}

/// One setting with its effective value.
#[derive(Debug, Serialize, Tabled)]
struct SettingRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: &'static str,
}

impl SettingRow {
    fn new(config: &ConfigFile, key: ConfigKey) -> Self {
        Self {
            key: key.as_str(),
            value: config.value(key).to_string(),
            source: if config.is_set(key) { "file" } else { "default" },
        }
    }
}

/// One entry of `config list`.
#[derive(Debug, Serialize, Tabled)]
struct KeyInfo {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
    #[tabled(rename = "Default")]
    default: &'static str,
}

/// Execute the config command.
pub fn execute(args: ConfigArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show(format),
        ConfigCommand::Get { key } => get(&key, format),
        ConfigCommand::Set { key, value } => set(&key, value),
        ConfigCommand::List => list(format),
        ConfigCommand::Reset { all, key } => reset(all, key.as_deref()),
        ConfigCommand::Path => path(),
    }
}

fn show(format: OutputFormat) -> Result<()> {
    let config = ConfigFile::load()?;
    let rows: Vec<SettingRow> = ConfigKey::all()
        .iter()
        .map(|key| SettingRow::new(&config, *key))
        .collect();

    match format {
        OutputFormat::Minimal => {
            for row in &rows {
                println!("{}={}", row.key, row.value);
            }
        }
        OutputFormat::Table => {
            print_header("Settings");
            print_output(&rows, format)?;
        }
        OutputFormat::Json | OutputFormat::Csv => print_output(&rows, format)?,
    }
    Ok(())
}

fn get(name: &str, format: OutputFormat) -> Result<()> {
    let key = ConfigKey::parse(name)?;
    let config = ConfigFile::load()?;

    match format {
        OutputFormat::Minimal => println!("{}", config.value(key)),
        OutputFormat::Json => print_json_value(&SettingRow::new(&config, key))?,
        OutputFormat::Table | OutputFormat::Csv => {
            print_output(&[SettingRow::new(&config, key)], format)?;
        }
    }
    Ok(())
}

fn set(name: &str, value: String) -> Result<()> {
    let key = ConfigKey::parse(name)?;
    key.validate(&value)?;

    let mut config = ConfigFile::load()?;
    print_success(&format!("{} = {}", key.as_str(), value));
    config.set(key, value);
    config.save()
}

fn list(format: OutputFormat) -> Result<()> {
    let keys: Vec<KeyInfo> = ConfigKey::all()
        .iter()
        .map(|key| KeyInfo {
            key: key.as_str(),
            description: key.description(),
            default: key.default_value(),
        })
        .collect();

    match format {
        OutputFormat::Minimal => {
            for info in &keys {
                println!("{}", info.key);
            }
        }
        OutputFormat::Table => {
            print_header("Available Settings");
            print_output(&keys, format)?;
        }
        OutputFormat::Json | OutputFormat::Csv => print_output(&keys, format)?,
    }
    Ok(())
}

fn reset(all: bool, name: Option<&str>) -> Result<()> {
    let mut config = ConfigFile::load().unwrap_or_default();

    match name {
        Some(name) if !all => {
            let key = ConfigKey::parse(name)?;
            config.remove(key);
            print_success(&format!("{} reset to {:?}", key.as_str(), key.default_value()));
        }
        _ => {
            config.clear();
            print_success("All settings reset to defaults");
        }
    }
    config.save()
}

fn path() -> Result<()> {
    let path = config_path()?;
    let status = if path.exists() { "exists" } else { "not created yet" };
    print_info(&format!("{} ({status})", path.display()));
    Ok(())
}
