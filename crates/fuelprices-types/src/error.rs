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

use thiserror::Error;

/// Configuration errors, fatal at load time
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown company '{0}' (supported: circlek, f24, goon, ingo, oil, ok, q8, shell, unox)")]
    UnknownCompany(String),

    #[error(
        "unknown fuel type '{0}' (supported: oktan 95, oktan 95+, oktan 100, diesel, diesel+, charge, quickcharge)"
    )]
    UnknownFuelType(String),

    #[error("at least one company must be configured")]
    NoCompanies,

    #[error("at least one fuel type must be configured")]
    NoFuelTypes,

    #[error("update_interval must be at least {min}s, got {secs}s")]
    IntervalTooShort { secs: u64, min: u64 },

    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
