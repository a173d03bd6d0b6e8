//! Optional TOML configuration for the command-line tool.
//!
//! ```toml
//! snapshot_path = "regulations_cache.json"
//! log_level = "debug"
//! format = "text"
//!
//! [defaults]
//! monthly_profit = 200000
//! days_in_month = 22
//! margin_percent = "35,5"
//! opf = "OOO"
//! tax_system = "USN_15"
//! ```
//!
//! Command-line flags take precedence over the file; anything set in neither
//! place falls back to the calculator's built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use plan_core::RawInputs;
use serde::Deserialize;
use thiserror::Error;

use crate::report::OutputFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default calculator inputs. Numbers may be written as TOML numbers or strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDefaults {
    pub monthly_profit: Option<toml::Value>,
    pub days_in_month: Option<toml::Value>,
    pub margin_percent: Option<toml::Value>,
    pub opf: Option<String>,
    pub tax_system: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfig {
    pub snapshot_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub defaults: InputDefaults,
}

impl PlanConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Fills every input missing from `cli` with the configured default.
    pub fn merge_inputs(
        &self,
        cli: RawInputs,
    ) -> RawInputs {
        let defaults = &self.defaults;
        RawInputs {
            monthly_profit: cli
                .monthly_profit
                .or_else(|| defaults.monthly_profit.as_ref().and_then(scalar_text)),
            days_in_month: cli
                .days_in_month
                .or_else(|| defaults.days_in_month.as_ref().and_then(scalar_text)),
            margin_percent: cli
                .margin_percent
                .or_else(|| defaults.margin_percent.as_ref().and_then(scalar_text)),
            entity_form_code: cli.entity_form_code.or_else(|| defaults.opf.clone()),
            tax_regime_code: cli.tax_regime_code.or_else(|| defaults.tax_system.clone()),
        }
    }
}

fn scalar_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        _ => None,
    }
}
