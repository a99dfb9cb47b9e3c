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

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::company::Company;
use crate::error::{ConfigError, ConfigResult};
use crate::fuel::FuelType;
use crate::record::PriceKey;

pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 3600;
pub const MIN_UPDATE_INTERVAL_SECS: u64 = 60;

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

/// Which companies and fuel types to track, and how often
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelPricesConfig {
    /// Seconds between refresh cycles
    #[serde(rename = "update_interval", default = "default_update_interval")]
    pub update_interval_secs: u64,

    pub companies: BTreeSet<Company>,

    #[serde(rename = "fueltypes")]
    pub fuel_types: BTreeSet<FuelType>,
}

impl Default for FuelPricesConfig {
    /// Every company and every fuel type, refreshed hourly
    fn default() -> Self {
        Self {
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
            companies: Company::all().iter().copied().collect(),
            fuel_types: FuelType::all().iter().copied().collect(),
        }
    }
}

impl FuelPricesConfig {
    /// Build a validated configuration
    pub fn new(
        companies: impl IntoIterator<Item = Company>,
        fuel_types: impl IntoIterator<Item = FuelType>,
        update_interval_secs: u64,
    ) -> ConfigResult<Self> {
        let config = Self {
            update_interval_secs,
            companies: companies.into_iter().collect(),
            fuel_types: fuel_types.into_iter().collect(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.companies.is_empty() {
            return Err(ConfigError::NoCompanies);
        }
        if self.fuel_types.is_empty() {
            return Err(ConfigError::NoFuelTypes);
        }
        if self.update_interval_secs < MIN_UPDATE_INTERVAL_SECS {
            return Err(ConfigError::IntervalTooShort {
                secs: self.update_interval_secs,
                min: MIN_UPDATE_INTERVAL_SECS,
            });
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn tracks(&self, key: PriceKey) -> bool {
        self.companies.contains(&key.company) && self.fuel_types.contains(&key.fuel_type)
    }

    /// Every (company, fuel type) pair that gets a published slot, in stable order
    pub fn slots(&self) -> impl Iterator<Item = PriceKey> + '_ {
        self.companies.iter().flat_map(move |company| {
            self.fuel_types
                .iter()
                .map(move |fuel_type| PriceKey::new(*company, *fuel_type))
        })
    }

    /// Electric fuel types require extra requests for some retailers
    pub fn wants_electric(&self) -> bool {
        self.fuel_types.iter().any(FuelType::is_electric)
    }
}
