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

//! Retailer product labels and the fuel types they map to

use chrono::{DateTime, Utc};
use fuelprices_core::{FetchError, FetchResult};
use fuelprices_types::{Company, FuelType, PriceRecord, PriceType};
use std::collections::BTreeSet;
use tracing::trace;

use crate::parse::clean_price;

/// One product as a retailer labels it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub fuel_type: FuelType,
    pub name: &'static str,
    /// Product code for the GoEasy price API (F24, Q8)
    pub code: Option<u32>,
}

const fn product(fuel_type: FuelType, name: &'static str) -> Product {
    Product {
        fuel_type,
        name,
        code: None,
    }
}

const fn coded(fuel_type: FuelType, name: &'static str, code: u32) -> Product {
    Product {
        fuel_type,
        name,
        code: Some(code),
    }
}

const CIRCLE_K: &[Product] = &[
    product(FuelType::Oktan95, "miles95"),
    product(FuelType::Oktan95Plus, "miles+95"),
    product(FuelType::Diesel, "miles Diesel"),
    product(FuelType::DieselPlus, "miles+ Diesel"),
    product(FuelType::Quickcharge, "El Lynlader"),
];

const F24: &[Product] = &[
    coded(FuelType::Oktan95, "GoEasy 95 E10", 22253),
    coded(FuelType::Oktan95Plus, "GoEasy 95 Extra E5", 22603),
    coded(FuelType::Diesel, "GoEasy Diesel", 24453),
    coded(FuelType::DieselPlus, "GoEasy Diesel Extra", 24338),
    product(FuelType::Charge, "Hurtiglader"),
];

const GO_ON: &[Product] = &[
    product(FuelType::Oktan95, "Blyfri 95"),
    product(FuelType::Diesel, "Transportdiesel"),
];

const INGO: &[Product] = &[
    product(FuelType::Oktan95, "Benzin 95"),
    product(FuelType::Oktan95Plus, "UPGRADE 95"),
    product(FuelType::Diesel, "Diesel"),
];

const OIL: &[Product] = &[
    product(FuelType::Oktan95, "95 E10"),
    product(FuelType::Oktan95Plus, "PREMIUM 98"),
    product(FuelType::Diesel, "Diesel"),
];

const OK: &[Product] = &[
    product(FuelType::Oktan95, "Blyfri 95"),
    product(FuelType::Oktan100, "Oktan 100"),
    product(FuelType::Diesel, "Diesel"),
];

const Q8: &[Product] = &[
    coded(FuelType::Oktan95, "GoEasy 95 E10", 22251),
    coded(FuelType::Oktan95Plus, "GoEasy 95 Extra E5", 22601),
    coded(FuelType::Diesel, "GoEasy Diesel", 24451),
    coded(FuelType::DieselPlus, "GoEasy Diesel Extra", 24337),
    product(FuelType::Charge, "Hurtiglader"),
    product(FuelType::Quickcharge, "Lynlader"),
];

const SHELL: &[Product] = &[
    product(FuelType::Oktan95, "Shell FuelSave 95 oktan"),
    product(FuelType::Oktan100, "Shell V-Power 100 oktan"),
    product(FuelType::Diesel, "Shell FuelSave Diesel"),
    product(FuelType::DieselPlus, "Shell V-Power Diesel"),
    product(FuelType::Quickcharge, "El/kWh"),
];

const UNO_X: &[Product] = &[
    product(FuelType::Oktan95, "Blyfri 95 E10"),
    product(FuelType::Oktan100, "Blyfri 100"),
    product(FuelType::Diesel, "Diesel"),
];

/// Every product a company publishes a price for
pub fn products(company: Company) -> &'static [Product] {
    match company {
        Company::CircleK => CIRCLE_K,
        Company::F24 => F24,
        Company::GoOn => GO_ON,
        Company::Ingo => INGO,
        Company::Oil => OIL,
        Company::Ok => OK,
        Company::Q8 => Q8,
        Company::Shell => SHELL,
        Company::UnoX => UNO_X,
    }
}

/// Whether any company sells this fuel type
pub fn offered_by(company: Company, fuel_type: FuelType) -> bool {
    products(company).iter().any(|p| p.fuel_type == fuel_type)
}

/// The subset of a company's products that was asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductTable {
    company: Company,
    products: Vec<Product>,
}

impl ProductTable {
    pub fn new(company: Company, wanted: &BTreeSet<FuelType>) -> Self {
        Self {
            company,
            products: products(company)
                .iter()
                .filter(|p| wanted.contains(&p.fuel_type))
                .copied()
                .collect(),
        }
    }

    pub fn company(&self) -> Company {
        self.company
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Find the product for a cleaned retailer label
    pub fn lookup(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    pub fn get(&self, fuel_type: FuelType) -> Option<&Product> {
        self.products.iter().find(|p| p.fuel_type == fuel_type)
    }

    pub fn has_electric(&self) -> bool {
        self.products.iter().any(|p| p.fuel_type.is_electric())
    }
}

/// Accumulates the records of one fetch. The first price per fuel type wins.
#[derive(Debug)]
pub(crate) struct RecordCollector {
    company: Company,
    price_type: PriceType,
    fetched_at: DateTime<Utc>,
    seen: BTreeSet<FuelType>,
    records: Vec<PriceRecord>,
}

impl RecordCollector {
    pub(crate) fn new(company: Company) -> Self {
        Self {
            company,
            price_type: PriceType::Pump,
            fetched_at: Utc::now(),
            seen: BTreeSet::new(),
            records: Vec::new(),
        }
    }

    pub(crate) fn with_price_type(mut self, price_type: PriceType) -> Self {
        self.price_type = price_type;
        self
    }

    /// Record a price unless one was already found for this fuel type
    pub(crate) fn push(&mut self, product: &Product, raw_price: &str) -> FetchResult<()> {
        if self.contains(product.fuel_type) {
            trace!("{}: ignoring repeated '{}'", self.company, product.name);
            return Ok(());
        }
        let price = clean_price(self.company, raw_price)?;
        self.push_price(product, price);
        Ok(())
    }

    pub(crate) fn push_price(&mut self, product: &Product, price: rust_decimal::Decimal) {
        if !self.seen.insert(product.fuel_type) {
            trace!("{}: ignoring repeated '{}'", self.company, product.name);
            return;
        }
        self.records.push(
            PriceRecord::new(
                self.company,
                product.fuel_type,
                product.name,
                price,
                self.fetched_at,
            )
            .with_price_type(self.price_type),
        );
    }

    pub(crate) fn contains(&self, fuel_type: FuelType) -> bool {
        self.seen.contains(&fuel_type)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Finish the fetch; an empty result is reported as [`FetchError::NoPrices`]
    pub(crate) fn finish(self) -> FetchResult<Vec<PriceRecord>> {
        if self.records.is_empty() {
            return Err(FetchError::NoPrices {
                company: self.company,
            });
        }
        Ok(self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_company_has_products() {
        for company in Company::all() {
            assert!(!products(*company).is_empty(), "{company} has no products");
        }
    }

    #[test]
    fn test_goeasy_fuels_carry_codes() {
        for company in [Company::F24, Company::Q8] {
            for p in products(company) {
                assert_eq!(p.code.is_some(), !p.fuel_type.is_electric(), "{}", p.name);
            }
        }
    }

    #[test]
    fn test_product_table_filters_wanted() {
        let wanted = BTreeSet::from([FuelType::Diesel, FuelType::Quickcharge]);
        let table = ProductTable::new(Company::Shell, &wanted);

        assert_eq!(table.iter().count(), 2);
        assert_eq!(
            table.lookup("Shell FuelSave Diesel").map(|p| p.fuel_type),
            Some(FuelType::Diesel)
        );
        assert!(table.lookup("Shell V-Power Diesel").is_none());
        assert!(table.has_electric());
    }

    #[test]
    fn test_offered_by() {
        assert!(offered_by(Company::Q8, FuelType::Quickcharge));
        assert!(!offered_by(Company::GoOn, FuelType::Oktan100));
    }

    #[test]
    fn test_collector_keeps_first_price() {
        let diesel = products(Company::Oil)[2];
        let mut collector = RecordCollector::new(Company::Oil);
        collector.push(&diesel, "12,49").unwrap();
        collector.push(&diesel, "99,99").unwrap();

        let records = collector.finish().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price.to_string(), "12.49");
        assert_eq!(records[0].product_name, "Diesel");
    }

    #[test]
    fn test_collector_skips_repeated_row_with_placeholder_price() {
        let diesel = products(Company::Oil)[2];
        let mut collector = RecordCollector::new(Company::Oil);
        collector.push(&diesel, "12,49").unwrap();
        collector.push(&diesel, "-").unwrap();

        let records = collector.finish().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price.to_string(), "12.49");
    }

    #[test]
    fn test_empty_collector_is_no_prices() {
        let result = RecordCollector::new(Company::Ingo).finish();
        assert_eq!(
            result,
            Err(FetchError::NoPrices {
                company: Company::Ingo
            })
        );
    }
}
