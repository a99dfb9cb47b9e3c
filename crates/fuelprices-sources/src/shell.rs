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

use async_trait::async_trait;
use fuelprices_core::{FetchError, FetchResult, PriceSource};
use fuelprices_types::{Company, PriceRecord};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{ProductTable, RecordCollector};
use crate::http::SourceClient;
use crate::parse::json_price;

pub const DAILY_PRICES_PATH: &str = "/wp-json/shell-wp/v2/daily-prices";

#[derive(Debug, Deserialize)]
struct DailyPrices {
    results: DailyPriceResults,
}

#[derive(Debug, Deserialize)]
struct DailyPriceResults {
    products: Vec<DailyPriceProduct>,
}

#[derive(Debug, Deserialize)]
struct DailyPriceProduct {
    name: String,
    price_incl_vat: Value,
}

/// Shell's WordPress daily price endpoint
#[derive(Debug, Clone)]
pub struct ShellSource {
    client: SourceClient,
    url: String,
    products: ProductTable,
}

impl ShellSource {
    pub fn new(client: SourceClient, base_url: &str, products: ProductTable) -> Self {
        Self {
            client,
            url: format!("{}{DAILY_PRICES_PATH}", base_url.trim_end_matches('/')),
            products,
        }
    }

    pub fn parse_response(&self, body: &str) -> FetchResult<Vec<PriceRecord>> {
        let company = self.client.company();
        let prices: DailyPrices = serde_json::from_str(body)
            .map_err(|e| FetchError::parse(company, format!("daily prices JSON: {e}")))?;

        let mut collector = RecordCollector::new(company);
        for entry in &prices.results.products {
            if let Some(product) = self.products.lookup(&entry.name)
                && !collector.contains(product.fuel_type)
            {
                collector.push_price(product, json_price(company, &entry.price_incl_vat)?);
            }
        }
        collector.finish()
    }
}

#[async_trait]
impl PriceSource for ShellSource {
    fn company(&self) -> Company {
        Company::Shell
    }

    async fn fetch_prices(&self) -> FetchResult<Vec<PriceRecord>> {
        let body = self.client.get_text(&self.url).await?;
        self.parse_response(&body)
    }
}
