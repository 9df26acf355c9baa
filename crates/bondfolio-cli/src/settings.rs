//! Persistent CLI settings.
//!
//! Stored as a flat JSON object of strings at
//! `<config dir>/bondfolio/config.json`. `BONDFOLIO_CONFIG_DIR` replaces
//! `<config dir>/bondfolio`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use bondfolio_core::types::CurrencyCode;
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "BONDFOLIO_CONFIG_DIR";

/// CLI configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    /// Default output format
    DefaultFormat,
    /// Reporting currency
    BaseCurrency,
    /// Instrument cache file
    StorePath,
    /// Precision for decimal output
    DecimalPrecision,
    /// Whether to use colors
    UseColors,
}

impl ConfigKey {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default_format" | "format" => Some(Self::DefaultFormat),
            "base_currency" | "currency" => Some(Self::BaseCurrency),
            "store_path" | "store" => Some(Self::StorePath),
            "decimal_precision" | "precision" => Some(Self::DecimalPrecision),
            "use_colors" | "colors" => Some(Self::UseColors),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> CliResult<Self> {
        Self::from_str(s).ok_or_else(|| CliError::UnknownKey(s.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultFormat => "default_format",
            Self::BaseCurrency => "base_currency",
            Self::StorePath => "store_path",
            Self::DecimalPrecision => "decimal_precision",
            Self::UseColors => "use_colors",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DefaultFormat => "Default output format (table, json, csv, minimal)",
            Self::BaseCurrency => "Reporting currency (RUB, USD, ...)",
            Self::StorePath => "Instrument cache file (empty: platform data directory)",
            Self::DecimalPrecision => "Number of decimal places for output (0-10)",
            Self::UseColors => "Enable colored output (true, false)",
        }
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            Self::DefaultFormat => "table",
            Self::BaseCurrency => "RUB",
            Self::StorePath => "",
            Self::DecimalPrecision => "2",
            Self::UseColors => "true",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::DefaultFormat,
            Self::BaseCurrency,
            Self::StorePath,
            Self::DecimalPrecision,
            Self::UseColors,
        ]
    }

    /// Checks a value before it is saved.
    pub fn validate(&self, value: &str) -> CliResult<()> {
        let invalid = |hint: &str| CliError::Config(format!("invalid {}: {value}. {hint}", self.as_str()));
        match self {
            Self::DefaultFormat => {
                OutputFormat::from_name(value)
                    .ok_or_else(|| invalid("Use table, json, csv, or minimal."))?;
            }
            Self::BaseCurrency => {
                CurrencyCode::new(value).map_err(|_| CliError::InvalidCurrency(value.to_string()))?;
            }
            Self::StorePath => {}
            Self::DecimalPrecision => {
                let precision: usize = value.parse().map_err(|_| invalid("Must be a number."))?;
                if precision > 10 {
                    return Err(invalid("Must be between 0 and 10."));
                }
            }
            Self::UseColors => {
                parse_bool(value).ok_or_else(|| invalid("Use true or false."))?;
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Raw config file contents.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(flatten)]
    values: BTreeMap<String, String>,
}

impl ConfigFile {
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Stored value or the key's default.
    pub fn value(&self, key: ConfigKey) -> &str {
        self.values
            .get(key.as_str())
            .map(String::as_str)
            .unwrap_or(key.default_value())
    }

    pub fn is_set(&self, key: ConfigKey) -> bool {
        self.values.contains_key(key.as_str())
    }

    pub fn set(&mut self, key: ConfigKey, value: String) {
        self.values.insert(key.as_str().to_string(), value);
    }

    pub fn remove(&mut self, key: ConfigKey) {
        self.values.remove(key.as_str());
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Get the config file path.
pub fn config_path() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir).join("config.json"));
    }
    let home = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(home.join("bondfolio").join("config.json"))
}

/// Settings resolved from the config file and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub default_format: OutputFormat,
    pub base_currency: CurrencyCode,
    pub store_path: PathBuf,
    pub decimal_precision: usize,
    pub use_colors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Table,
            base_currency: CurrencyCode::RUB,
            store_path: default_store_path(),
            decimal_precision: 2,
            use_colors: true,
        }
    }
}

impl Settings {
    /// Loads and validates the saved settings.
    pub fn load() -> Result<Self> {
        Ok(Self::from_file(&ConfigFile::load()?)?)
    }

    pub fn from_file(file: &ConfigFile) -> CliResult<Self> {
        for key in ConfigKey::all() {
            key.validate(file.value(*key))?;
        }

        let store_path = match file.value(ConfigKey::StorePath) {
            "" => default_store_path(),
            path => PathBuf::from(path),
        };

        let defaults = Self::default();
        Ok(Self {
            default_format: OutputFormat::from_name(file.value(ConfigKey::DefaultFormat))
                .unwrap_or(defaults.default_format),
            base_currency: CurrencyCode::new(file.value(ConfigKey::BaseCurrency))
                .unwrap_or(defaults.base_currency),
            store_path,
            decimal_precision: file
                .value(ConfigKey::DecimalPrecision)
                .parse()
                .unwrap_or(defaults.decimal_precision),
            use_colors: parse_bool(file.value(ConfigKey::UseColors)).unwrap_or(defaults.use_colors),
        })
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|d| d.join("bondfolio").join("bonds.redb"))
        .unwrap_or_else(|| PathBuf::from("bonds.redb"))
}
