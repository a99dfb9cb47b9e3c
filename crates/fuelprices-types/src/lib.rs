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

//! Shared data model for FuelPrices DK.
//!
//! Retailers, fuel types, price records and the user-facing configuration
//! live here so that fetchers, the aggregator and the publishers agree on a
//! single vocabulary.

pub mod company;
pub mod config;
pub mod error;
pub mod fuel;
pub mod record;

// Re-export common types for convenience
pub use company::Company;
pub use config::{DEFAULT_UPDATE_INTERVAL_SECS, FuelPricesConfig, MIN_UPDATE_INTERVAL_SECS};
pub use error::{ConfigError, ConfigResult};
pub use fuel::{FuelType, PriceUnit};
pub use record::{CURRENCY, PriceKey, PriceRecord, PriceType};
