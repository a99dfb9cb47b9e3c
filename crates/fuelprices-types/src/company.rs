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

/// Danish fuel retailers supported by FuelPrices DK
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Company {
    #[serde(rename = "circlek")]
    CircleK,
    #[serde(rename = "f24")]
    F24,
    #[serde(rename = "goon")]
    GoOn,
    #[serde(rename = "ingo")]
    Ingo,
    #[serde(rename = "oil")]
    Oil,
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "q8")]
    Q8,
    #[serde(rename = "shell")]
    Shell,
    #[serde(rename = "unox")]
    UnoX,
}

impl Company {
    /// Config key, also used in entity ids
    pub fn key(&self) -> &'static str {
        match self {
            Self::CircleK => "circlek",
            Self::F24 => "f24",
            Self::GoOn => "goon",
            Self::Ingo => "ingo",
            Self::Oil => "oil",
            Self::Ok => "ok",
            Self::Q8 => "q8",
            Self::Shell => "shell",
            Self::UnoX => "unox",
        }
    }

    /// Name as the retailer brands itself
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CircleK => "Circle K",
            Self::F24 => "F24",
            Self::GoOn => "Go' on",
            Self::Ingo => "Ingo",
            Self::Oil => "OIL!",
            Self::Ok => "OK",
            Self::Q8 => "Q8",
            Self::Shell => "Shell",
            Self::UnoX => "Uno-X",
        }
    }

    /// Public page where the retailer lists its prices
    pub fn price_page_url(&self) -> &'static str {
        match self {
            Self::CircleK => "https://www.circlek.dk/priser",
            Self::F24 => "https://www.f24.dk/priser/",
            Self::GoOn => "https://goon.nu/priser/#Aktuellelistepriser",
            Self::Ingo => "https://www.ingo.dk/br%C3%A6ndstofpriser/aktuelle-br%C3%A6ndstofpriser",
            Self::Oil => "https://www.oil-tankstationer.dk/de-gaeldende-braendstofpriser/",
            Self::Ok => {
                "https://www.ok.dk/offentlig/produkter/braendstof/priser/vejledende-standerpriser"
            }
            Self::Q8 => "https://www.q8.dk/priser/",
            Self::Shell => "https://shellservice.dk/wp-json/shell-wp/v2/daily-prices",
            Self::UnoX => "https://unoxmobility.dk/privat/braendstofpriser",
        }
    }

    /// List all supported companies
    pub fn all() -> &'static [Company] {
        &[
            Self::CircleK,
            Self::F24,
            Self::GoOn,
            Self::Ingo,
            Self::Oil,
            Self::Ok,
            Self::Q8,
            Self::Shell,
            Self::UnoX,
        ]
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Company {
    type Err = ConfigError;

    /// Accepts config keys as well as display names ("Circle K", "Uno-X", "OIL!")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::all()
            .iter()
            .find(|c| c.key() == normalized)
            .copied()
            .ok_or_else(|| ConfigError::UnknownCompany(s.to_owned()))
    }
}

impl TryFrom<String> for Company {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_keys() {
        for company in Company::all() {
            assert_eq!(company.key().parse::<Company>().unwrap(), *company);
        }
    }

    #[test]
    fn test_parse_display_names() {
        assert_eq!("Circle K".parse::<Company>().unwrap(), Company::CircleK);
        assert_eq!("Uno-X".parse::<Company>().unwrap(), Company::UnoX);
        assert_eq!("OIL!".parse::<Company>().unwrap(), Company::Oil);
        assert_eq!("Go' on".parse::<Company>().unwrap(), Company::GoOn);
    }

    #[test]
    fn test_unknown_company() {
        let err = "statoil".parse::<Company>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownCompany("statoil".to_owned()));
    }

    #[test]
    fn test_serde_uses_config_key() {
        let json = serde_json::to_string(&Company::UnoX).unwrap();
        assert_eq!(json, "\"unox\"");

        let parsed: Company = serde_json::from_str("\"Circle K\"").unwrap();
        assert_eq!(parsed, Company::CircleK);
    }
}
