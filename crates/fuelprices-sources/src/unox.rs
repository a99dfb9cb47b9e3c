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

pub const PRICES_PATH: &str = "/privat/braendstofpriser";

/// Server action id of the price page. Changes when the site is redeployed.
pub const NEXT_ACTION: &str = "af4e45c438f5f7db0b7e0403b31b98968abad4d8";

const ACTION_BODY: &str = r#"["prices_data"]"#;

#[derive(Debug, Deserialize)]
struct PriceEntry {
    #[serde(rename = "ProduktNavn")]
    product_name: String,
    #[serde(rename = "PumpePris")]
    pump_price: Value,
}

/// Uno-X serves prices through a Next.js server action
#[derive(Debug, Clone)]
pub struct UnoXSource {
    client: SourceClient,
    url: String,
    products: ProductTable,
}

impl UnoXSource {
    pub fn new(client: SourceClient, base_url: &str, products: ProductTable) -> Self {
        Self {
            client,
            url: format!("{}{PRICES_PATH}", base_url.trim_end_matches('/')),
            products,
        }
    }

    /// The action response is a line-oriented stream; line 2 carries the
    /// price history as `1:[...]`, newest first.
    pub fn parse_response(&self, body: &str) -> FetchResult<Vec<PriceRecord>> {
        let company = self.client.company();
        let line = body
            .lines()
            .nth(1)
            .ok_or_else(|| FetchError::parse(company, "price data line missing"))?;
        let payload = line.replacen("1:", "", 1);
        let entries: Vec<PriceEntry> = serde_json::from_str(payload.trim())
            .map_err(|e| FetchError::parse(company, format!("price data JSON: {e}")))?;

        let mut collector = RecordCollector::new(company);
        for entry in &entries {
            let Some(product) = self.products.lookup(&entry.product_name) else {
                continue;
            };
            if collector.contains(product.fuel_type) {
                continue;
            }
            collector.push_price(product, json_price(company, &entry.pump_price)?);
            if self.products.iter().all(|p| collector.contains(p.fuel_type)) {
                break;
            }
        }
        collector.finish()
    }
}

#[async_trait]
impl PriceSource for UnoXSource {
    fn company(&self) -> Company {
        Company::UnoX
    }

    async fn fetch_prices(&self) -> FetchResult<Vec<PriceRecord>> {
        let body = self
            .client
            .post_raw(
                &self.url,
                &[
                    ("Referer", self.url.as_str()),
                    ("Next-Action", NEXT_ACTION),
                    ("Cookie", "NEXT_LOCALE=privat"),
                ],
                ACTION_BODY,
            )
            .await?;
        self.parse_response(&body)
    }
}
