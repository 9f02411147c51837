//! TOML configuration for the forecaster.
//!
//! Every table and field is optional; anything missing falls back to the
//! defaults below.
//!
//! ```toml
//! [scenario]
//! horizon_years = 10
//! mortgage_principal = 250000
//! mortgage_rate_pct = 4.5
//!
//! [mortgage]
//! zero_rate_policy = "reject"     # or "linear" (default)
//!
//! [tax]
//! brackets = "brackets.csv"       # relative to this file
//! primary = "federal"
//! secondary = "ontario"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use forecast_core::calculations::IncomeTaxCalculator;
use forecast_core::{ScenarioInputs, TaxBracketSchedule, ZeroRatePolicy};
use forecast_data::{ScheduleLoader, ScheduleLoaderError};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub scenario: ScenarioInputs,
    pub mortgage: MortgageConfig,
    pub tax: TaxConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MortgageConfig {
    pub zero_rate_policy: ZeroRatePolicy,
}

/// Where the two tax schedules come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxConfig {
    /// CSV bracket table. When absent only the built-in schedules are available.
    pub brackets: Option<PathBuf>,
    pub primary: String,
    pub secondary: String,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            brackets: None,
            primary: "federal".to_string(),
            secondary: "ontario".to_string(),
        }
    }
}

impl ForecastConfig {
    /// Reads and parses a TOML config file.
    ///
    /// A relative `tax.brackets` path is resolved against the directory of
    /// the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let (Some(brackets), Some(dir)) = (&config.tax.brackets, path.parent()) {
            if brackets.is_relative() {
                config.tax.brackets = Some(dir.join(brackets));
            }
        }
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parses config text without touching the filesystem.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

impl TaxConfig {
    /// Builds the two-schedule calculator this config describes.
    pub fn calculator(&self) -> Result<IncomeTaxCalculator, ScheduleLoaderError> {
        let (primary, secondary) = match &self.brackets {
            Some(path) => {
                let table = ScheduleLoader::load_from_file(path)?;
                (
                    table.get(&self.primary)?.clone(),
                    table.get(&self.secondary)?.clone(),
                )
            }
            None => (builtin(&self.primary)?, builtin(&self.secondary)?),
        };
        Ok(IncomeTaxCalculator::new(primary, secondary))
    }
}

fn builtin(jurisdiction: &str) -> Result<TaxBracketSchedule, ScheduleLoaderError> {
    match jurisdiction.trim().to_lowercase().as_str() {
        "federal" => Ok(TaxBracketSchedule::canada_federal()),
        "ontario" => Ok(TaxBracketSchedule::ontario()),
        _ => Err(ScheduleLoaderError::UnknownJurisdiction(
            jurisdiction.to_string(),
        )),
    }
}
