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

use fuelprices_sources::offered_by;
use fuelprices_types::{ConfigError, FuelPricesConfig};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Field-level errors and warnings found in a configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    /// Prevent the configuration from being used
    pub errors: Vec<ValidationIssue>,
    /// The configuration works, but some sensors will never get a price
    pub warnings: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Field path, e.g. "fuelprices.companies"
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn log_warnings(&self) {
        for issue in &self.warnings {
            warn!("⚠️ Config: {issue}");
        }
    }
}

/// Check the `[fuelprices]` section
pub fn validate_fuelprices(config: &FuelPricesConfig, result: &mut ValidationResult) {
    if let Err(e) = config.validate() {
        let field = match e {
            ConfigError::NoCompanies | ConfigError::UnknownCompany(_) => "fuelprices.companies",
            ConfigError::NoFuelTypes | ConfigError::UnknownFuelType(_) => "fuelprices.fueltypes",
            ConfigError::IntervalTooShort { .. } => "fuelprices.update_interval",
            ConfigError::Parse { .. } => "fuelprices",
        };
        result.add_error(field, e.to_string());
        return;
    }

    for fuel_type in &config.fuel_types {
        if !config.companies.iter().any(|c| offered_by(*c, *fuel_type)) {
            result.add_warning(
                "fuelprices.fueltypes",
                format!("no configured company sells '{}'", fuel_type.key()),
            );
        }
    }

    for company in &config.companies {
        if !config.fuel_types.iter().any(|f| offered_by(*company, *f)) {
            result.add_warning(
                "fuelprices.companies",
                format!("{company} sells none of the configured fuel types"),
            );
        }
    }
}
