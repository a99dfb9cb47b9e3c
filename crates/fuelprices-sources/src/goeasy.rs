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

//! F24 and Q8 share the GoEasy price API and page layout

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use fuelprices_core::{FetchError, FetchResult, PriceSource};
use fuelprices_types::{Company, FuelType, PriceRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{Product, ProductTable, RecordCollector};
use crate::http::SourceClient;
use crate::parse::{json_price, table_rows};

pub const PRICE_API_PATH: &str = "/-/api/PriceViewProduct/GetPriceViewProducts";
pub const PRICE_PAGE_PATH: &str = "/priser/";

/// The API wants a date window; a month back covers the current price
const LOOKBACK_DAYS: i64 = 31;

/// Row of the price page that holds the charging prices
const ELECTRIC_ROW: usize = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PriceViewRequest {
    from_date: i64,
    to_date: i64,
    fuels_id_list: Vec<FuelId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FuelId {
    product_code: u32,
    index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PriceViewResponse {
    products: Vec<PriceViewProduct>,
}

#[derive(Debug, Deserialize)]
struct PriceViewProduct {
    #[serde(rename = "PriceInclVATInclTax")]
    price_incl_vat_incl_tax: Value,
}

#[derive(Debug, Clone)]
pub struct GoEasySource {
    client: SourceClient,
    api_url: String,
    page_url: String,
    products: ProductTable,
}

impl GoEasySource {
    pub fn new(client: SourceClient, base_url: &str, products: ProductTable) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            client,
            api_url: format!("{base_url}{PRICE_API_PATH}"),
            page_url: format!("{base_url}{PRICE_PAGE_PATH}"),
            products,
        }
    }

    /// Fuel products to ask the API for, in request order
    fn coded_products(&self) -> Vec<(u32, &Product)> {
        self.products
            .iter()
            .filter_map(|p| p.code.map(|code| (code, p)))
            .collect()
    }

    async fn fetch_fuel(&self, collector: &mut RecordCollector) -> FetchResult<()> {
        let wanted = self.coded_products();
        if wanted.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let request = PriceViewRequest {
            from_date: (now - TimeDelta::days(LOOKBACK_DAYS)).timestamp(),
            to_date: now.timestamp(),
            fuels_id_list: wanted
                .iter()
                .enumerate()
                .map(|(index, (code, _))| FuelId {
                    product_code: *code,
                    index,
                })
                .collect(),
        };

        let body = self.client.post_json(&self.api_url, &request).await?;
        self.parse_fuel(&body, &wanted, collector)
    }

    fn parse_fuel(
        &self,
        body: &str,
        wanted: &[(u32, &Product)],
        collector: &mut RecordCollector,
    ) -> FetchResult<()> {
        let company = self.client.company();
        let response: PriceViewResponse = serde_json::from_str(body)
            .map_err(|e| FetchError::parse(company, format!("price view JSON: {e}")))?;

        // Products come back in the order they were requested
        for (index, (_, product)) in wanted.iter().enumerate() {
            let entry = response.products.get(index).ok_or_else(|| {
                FetchError::parse(
                    company,
                    format!("missing product #{index} ({})", product.name),
                )
            })?;
            collector.push_price(product, json_price(company, &entry.price_incl_vat_incl_tax)?);
        }
        Ok(())
    }

    async fn fetch_electric(&self, collector: &mut RecordCollector) -> FetchResult<()> {
        let html = self.client.get_text(&self.page_url).await?;
        self.parse_electric(&html, collector)
    }

    /// Charging prices sit in a fixed table row after a label cell. With two
    /// prices the first is the fast charger and the second the regular one;
    /// otherwise the first price is the regular charger.
    fn parse_electric(&self, html: &str, collector: &mut RecordCollector) -> FetchResult<()> {
        let company = self.client.company();
        let rows = table_rows(company, html)?;
        let cells = rows
            .get(ELECTRIC_ROW)
            .and_then(|row| row.get(1..))
            .filter(|cells| !cells.is_empty())
            .ok_or_else(|| FetchError::parse(company, "charging prices row not found"))?;

        if let [quick, _] = cells
            && let Some(product) = self.products.get(FuelType::Quickcharge)
        {
            collector.push(product, quick)?;
        }
        let charge = match cells {
            [_, charge] => Some(charge),
            _ => cells.first(),
        };
        if let (Some(product), Some(charge)) = (self.products.get(FuelType::Charge), charge) {
            collector.push(product, charge)?;
        }
        Ok(())
    }
}

#[async_trait]
impl PriceSource for GoEasySource {
    fn company(&self) -> Company {
        self.client.company()
    }

    async fn fetch_prices(&self) -> FetchResult<Vec<PriceRecord>> {
        let mut collector = RecordCollector::new(self.client.company());

        self.fetch_fuel(&mut collector).await?;

        if self.products.has_electric() {
            // Fuel prices survive a broken charging page
            if let Err(e) = self.fetch_electric(&mut collector).await {
                if collector.len() == 0 {
                    return Err(e);
                }
                warn!("⚠️ [FETCH] {e}");
            }
        }

        debug!("{}: {} prices", self.client.company(), collector.len());
        collector.finish()
    }
}
