// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FuelPrices DK.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

mod validation;

pub use validation::ValidationResult;

use anyhow::{Context, Result};
use fuelprices_types::{Company, ConfigError, FuelPricesConfig, FuelType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const ADDON_OPTIONS_PATH: &str = "/data/options.json";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Companies, fuel types and refresh interval
    #[serde(default)]
    pub fuelprices: FuelPricesConfig,

    #[serde(default)]
    pub system: SystemConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Home Assistant URL; the supervisor proxy is used when running as an add-on
    #[serde(default)]
    pub ha_base_url: Option<String>,

    /// Long-lived access token
    #[serde(default)]
    pub ha_token: Option<String>,

    /// Fallback when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Port of the status API (0 disables it)
    #[serde(default = "default_status_port")]
    pub status_port: u16,
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_status_port() -> u16 {
    8098
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            ha_base_url: None,
            ha_token: None,
            log_level: default_log_level(),
            status_port: default_status_port(),
        }
    }
}

/// Where the configuration was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    AddonOptions,
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::AddonOptions => write!(f, "HA addon options"),
            Self::Environment => write!(f, "environment variables"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the explicit path, HA addon options, the
    /// working directory or the environment, in that order.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        if let Ok(options_str) = std::fs::read_to_string(ADDON_OPTIONS_PATH) {
            let config: AppConfig = serde_json::from_str(&options_str)
                .map_err(|e| parse_error(ADDON_OPTIONS_PATH, e))?;
            config.validate()?;
            return Ok((config, ConfigSource::AddonOptions));
        }

        for candidate in ["config.toml", "config.json"] {
            let path = Path::new(candidate);
            if path.exists() {
                let config = Self::from_file(path)?;
                return Ok((config, ConfigSource::File(path.to_path_buf())));
            }
        }

        let config = Self::from_env()?;
        config.validate()?;
        Ok((config, ConfigSource::Environment))
    }

    /// Read a TOML (`.toml`) or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let source_name = path.display().to_string();
        let config: AppConfig = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content).map_err(|e| parse_error(&source_name, e))?
        } else {
            serde_json::from_str(&content).map_err(|e| parse_error(&source_name, e))?
        };

        config.validate()?;
        Ok(config)
    }

    fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `FUELPRICES_*` and `HA_*` variables
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(companies) = lookup("FUELPRICES_COMPANIES") {
            config.fuelprices.companies =
                parse_list::<Company>(&companies).context("Invalid FUELPRICES_COMPANIES")?;
        }

        if let Some(fuel_types) = lookup("FUELPRICES_FUELTYPES") {
            config.fuelprices.fuel_types =
                parse_list::<FuelType>(&fuel_types).context("Invalid FUELPRICES_FUELTYPES")?;
        }

        if let Some(interval) = lookup("FUELPRICES_UPDATE_INTERVAL") {
            config.fuelprices.update_interval_secs = interval
                .trim()
                .parse()
                .with_context(|| format!("Invalid FUELPRICES_UPDATE_INTERVAL '{interval}'"))?;
        }

        if let Some(url) = lookup("HA_BASE_URL") {
            config.system.ha_base_url = Some(url);
        }
        if let Some(token) = lookup("HA_TOKEN") {
            config.system.ha_token = Some(token);
        }

        Ok(config)
    }

    pub fn validate_detailed(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validation::validate_fuelprices(&self.fuelprices, &mut result);

        if self
            .system
            .ha_base_url
            .as_deref()
            .is_some_and(|url| !url.starts_with("http://") && !url.starts_with("https://"))
        {
            result.add_error("system.ha_base_url", "must start with http:// or https://");
        }

        result
    }

    pub fn validate(&self) -> Result<()> {
        let result = self.validate_detailed();
        if !result.is_valid() {
            let issues: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("Invalid configuration: {}", issues.join("; "));
        }
        Ok(())
    }
}

fn parse_error(source_name: &str, e: impl fmt::Display) -> ConfigError {
    ConfigError::Parse {
        source_name: source_name.to_owned(),
        reason: e.to_string(),
    }
}

fn parse_list<T>(raw: &str) -> Result<BTreeSet<T>>
where
    T: FromStr + Ord,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| T::from_str(item).map_err(anyhow::Error::from))
        .collect()
}
