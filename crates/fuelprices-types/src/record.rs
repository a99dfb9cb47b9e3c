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

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::company::Company;
use crate::fuel::FuelType;

/// All prices are quoted in Danish kroner including VAT
pub const CURRENCY: &str = "DKK";

/// Whether a price is the actual pump price or a published list price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    #[default]
    Pump,
    List,
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pump => write!(f, "pump"),
            Self::List => write!(f, "list"),
        }
    }
}

/// Identifies one value slot: a company's price for one fuel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PriceKey {
    pub company: Company,
    pub fuel_type: FuelType,
}

impl PriceKey {
    pub fn new(company: Company, fuel_type: FuelType) -> Self {
        Self { company, fuel_type }
    }
}

impl fmt::Display for PriceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.company.key(), self.fuel_type.slug())
    }
}

/// A single price observation produced by a fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub company: Company,
    pub fuel_type: FuelType,
    /// The retailer's own label, e.g. "Shell FuelSave 95 oktan"
    pub product_name: String,
    /// DKK incl. VAT, two decimals
    pub price: Decimal,
    #[serde(default)]
    pub price_type: PriceType,
    pub fetched_at: DateTime<Utc>,
}

impl PriceRecord {
    pub fn new(
        company: Company,
        fuel_type: FuelType,
        product_name: impl Into<String>,
        price: Decimal,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            company,
            fuel_type,
            product_name: product_name.into(),
            price: price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            price_type: PriceType::Pump,
            fetched_at,
        }
    }

    pub fn with_price_type(mut self, price_type: PriceType) -> Self {
        self.price_type = price_type;
        self
    }

    pub fn key(&self) -> PriceKey {
        PriceKey::new(self.company, self.fuel_type)
    }
}
