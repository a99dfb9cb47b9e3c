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
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Tracked fuel and charging products
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum FuelType {
    #[serde(rename = "oktan 95")]
    Oktan95,
    #[serde(rename = "oktan 95+")]
    Oktan95Plus,
    #[serde(rename = "oktan 100")]
    Oktan100,
    #[serde(rename = "diesel")]
    Diesel,
    #[serde(rename = "diesel+")]
    DieselPlus,
    /// Regular EV charging ("lader")
    #[serde(rename = "charge")]
    Charge,
    /// Fast EV charging ("lynlader")
    #[serde(rename = "quickcharge")]
    Quickcharge,
}

/// Unit a price is quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceUnit {
    #[serde(rename = "kr/L")]
    KronerPerLiter,
    #[serde(rename = "kr/kWh")]
    KronerPerKwh,
}

impl PriceUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::KronerPerLiter => "kr/L",
            Self::KronerPerKwh => "kr/kWh",
        }
    }
}

impl FuelType {
    /// Config key as written in the configuration file
    pub fn key(&self) -> &'static str {
        match self {
            Self::Oktan95 => "oktan 95",
            Self::Oktan95Plus => "oktan 95+",
            Self::Oktan100 => "oktan 100",
            Self::Diesel => "diesel",
            Self::DieselPlus => "diesel+",
            Self::Charge => "charge",
            Self::Quickcharge => "quickcharge",
        }
    }

    /// Identifier-safe form used in entity ids
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Oktan95 => "oktan95",
            Self::Oktan95Plus => "oktan95plus",
            Self::Oktan100 => "oktan100",
            Self::Diesel => "diesel",
            Self::DieselPlus => "dieselplus",
            Self::Charge => "charge",
            Self::Quickcharge => "quickcharge",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Oktan95 => "Oktan 95",
            Self::Oktan95Plus => "Oktan 95+",
            Self::Oktan100 => "Oktan 100",
            Self::Diesel => "Diesel",
            Self::DieselPlus => "Diesel+",
            Self::Charge => "Charge",
            Self::Quickcharge => "Quickcharge",
        }
    }

    pub fn is_electric(&self) -> bool {
        matches!(self, Self::Charge | Self::Quickcharge)
    }

    pub fn unit(&self) -> PriceUnit {
        if self.is_electric() {
            PriceUnit::KronerPerKwh
        } else {
            PriceUnit::KronerPerLiter
        }
    }

    pub fn all() -> &'static [FuelType] {
        &[
            Self::Oktan95,
            Self::Oktan95Plus,
            Self::Oktan100,
            Self::Diesel,
            Self::DieselPlus,
            Self::Charge,
            Self::Quickcharge,
        ]
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for FuelType {
    type Err = ConfigError;

    /// Whitespace and case are ignored, so "Oktan 95+" and "oktan95+" are equal.
    /// The Danish names "lader" and "lynlader" are accepted for the charging types.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "oktan95" => Ok(Self::Oktan95),
            "oktan95+" | "oktan95plus" => Ok(Self::Oktan95Plus),
            "oktan100" => Ok(Self::Oktan100),
            "diesel" => Ok(Self::Diesel),
            "diesel+" | "dieselplus" => Ok(Self::DieselPlus),
            "charge" | "lader" => Ok(Self::Charge),
            "quickcharge" | "lynlader" => Ok(Self::Quickcharge),
            _ => Err(ConfigError::UnknownFuelType(s.to_owned())),
        }
    }
}

impl TryFrom<String> for FuelType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
