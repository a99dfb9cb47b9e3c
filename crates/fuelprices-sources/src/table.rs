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
use fuelprices_core::{FetchResult, PriceSource};
use fuelprices_types::{Company, PriceRecord, PriceType};
use tracing::debug;

use crate::catalog::{ProductTable, RecordCollector};
use crate::http::SourceClient;
use crate::parse::{clean_product_name, grid_rows, table_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMarkup {
    /// `<tr>` / `<td>`
    Table,
    /// `div[role=row]` / `div[role=gridcell]`
    Grid,
}

/// Where product label and price sit in a scraped price page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub markup: RowMarkup,
    pub product_col: usize,
    pub price_col: usize,
    pub price_type: PriceType,
}

impl PageLayout {
    const fn table(product_col: usize, price_col: usize) -> Self {
        Self {
            markup: RowMarkup::Table,
            product_col,
            price_col,
            price_type: PriceType::Pump,
        }
    }

    /// Layout for retailers that publish a plain HTML price page
    pub fn for_company(company: Company) -> Option<Self> {
        match company {
            Company::CircleK | Company::Ingo => Some(Self::table(1, 2)),
            Company::Oil => Some(Self::table(0, 2)),
            Company::GoOn => Some(Self {
                price_type: PriceType::List,
                ..Self::table(0, 7)
            }),
            Company::Ok => Some(Self {
                markup: RowMarkup::Grid,
                ..Self::table(0, 1)
            }),
            Company::F24 | Company::Q8 | Company::Shell | Company::UnoX => None,
        }
    }
}

/// Scrapes one HTML price page row by row
#[derive(Debug, Clone)]
pub struct HtmlTableSource {
    client: SourceClient,
    url: String,
    layout: PageLayout,
    products: ProductTable,
}

impl HtmlTableSource {
    pub fn new(
        client: SourceClient,
        url: impl Into<String>,
        layout: PageLayout,
        products: ProductTable,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            layout,
            products,
        }
    }

    /// Extract prices from a fetched page
    pub fn parse_page(&self, html: &str) -> FetchResult<Vec<PriceRecord>> {
        let company = self.client.company();
        let rows = match self.layout.markup {
            RowMarkup::Table => table_rows(company, html)?,
            RowMarkup::Grid => grid_rows(company, html)?,
        };

        let mut collector = RecordCollector::new(company).with_price_type(self.layout.price_type);
        for cells in &rows {
            let (Some(label), Some(price)) = (
                cells.get(self.layout.product_col),
                cells.get(self.layout.price_col),
            ) else {
                continue;
            };
            if let Some(product) = self.products.lookup(&clean_product_name(label)) {
                collector.push(product, price)?;
            }
        }

        debug!("{}: {} rows, {} prices", company, rows.len(), collector.len());
        collector.finish()
    }
}

#[async_trait]
impl PriceSource for HtmlTableSource {
    fn company(&self) -> Company {
        self.client.company()
    }

    async fn fetch_prices(&self) -> FetchResult<Vec<PriceRecord>> {
        let html = self.client.get_text(&self.url).await?;
        self.parse_page(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use fuelprices_core::FetchError;
    use fuelprices_types::FuelType;
    use mockito::Server;
    use std::collections::BTreeSet;

    fn source(company: Company, url: &str, wanted: &[FuelType]) -> HtmlTableSource {
        let wanted: BTreeSet<FuelType> = wanted.iter().copied().collect();
        HtmlTableSource::new(
            SourceClient::new(company, build_client().unwrap()),
            url,
            PageLayout::for_company(company).unwrap(),
            ProductTable::new(company, &wanted),
        )
    }

    const CIRCLE_K_PAGE: &str = r#"
        <table class="prices">
          <tr><th>Billede</th><th>Produkt</th><th>Pris</th></tr>
          <tr><td><img src="m95.png"></td><td>miles95</td><td>Pris inkl. moms: 13,89 kr.</td></tr>
          <tr><td><img src="m95p.png"></td><td>miles+95</td><td>Pris inkl. moms: 14,49 kr.</td></tr>
          <tr><td><img src="md.png"></td><td>miles Diesel</td><td>Pris inkl. moms: 12,49 kr.</td></tr>
          <tr><td><img src="el.png"></td><td>El Lynlader</td><td>Pris inkl. moms: 3,99 kr/kWh</td></tr>
        </table>
        <table class="history">
          <tr><td></td><td>miles95</td><td>Pris inkl. moms: 12,00 kr.</td></tr>
        </table>"#;

    #[test]
    fn test_circle_k_first_row_wins() {
        let source = source(
            Company::CircleK,
            "http://unused",
            &[FuelType::Oktan95, FuelType::Diesel, FuelType::Quickcharge],
        );

        let records = source.parse_page(CIRCLE_K_PAGE).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].fuel_type, FuelType::Oktan95);
        assert_eq!(records[0].price.to_string(), "13.89");
        assert_eq!(records[1].fuel_type, FuelType::Diesel);
        assert_eq!(records[2].fuel_type, FuelType::Quickcharge);
        assert_eq!(records[2].price.to_string(), "3.99");
        assert!(records.iter().all(|r| r.price_type == PriceType::Pump));
    }

    #[test]
    fn test_later_placeholder_row_does_not_fail_fetch() {
        let html = r"
            <table>
              <tr><td></td><td>miles95</td><td>13,89</td></tr>
              <tr><td></td><td>miles Diesel</td><td>12,49</td></tr>
            </table>
            <table>
              <tr><td></td><td>miles95</td><td>-</td></tr>
            </table>";
        let source = source(
            Company::CircleK,
            "http://unused",
            &[FuelType::Oktan95, FuelType::Diesel],
        );

        let records = source.parse_page(html).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].price.to_string(), "13.89");
        assert_eq!(records[1].price.to_string(), "12.49");
    }

    #[test]
    fn test_oil_product_names_are_cleaned() {
        let html = r"
            <table>
              <tr><td>Beskrivelse: 95 E10.</td><td>E10</td><td>13,59</td></tr>
              <tr><td>Diesel</td><td>B7</td><td>12,29</td></tr>
            </table>";
        let source = source(Company::Oil, "http://unused", &[FuelType::Oktan95, FuelType::Diesel]);

        let records = source.parse_page(html).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_name, "95 E10");
        assert_eq!(records[0].price.to_string(), "13.59");
    }

    #[test]
    fn test_go_on_reports_list_prices() {
        let html = r"
            <table>
              <tr><td>Blyfri 95</td><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td><td>6</td><td>13,19</td></tr>
              <tr><td>Transportdiesel</td><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td><td>6</td><td>11,99</td></tr>
            </table>";
        let source = source(Company::GoOn, "http://unused", &[FuelType::Diesel]);

        let records = source.parse_page(html).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_name, "Transportdiesel");
        assert_eq!(records[0].price_type, PriceType::List);
    }

    #[test]
    fn test_ok_grid_layout() {
        let html = r#"
            <div role="grid">
              <div role="row"><div role="gridcell">Blyfri 95</div><div role="gridcell">13,79 kr.</div></div>
              <div role="row"><div role="gridcell">Oktan 100</div><div role="gridcell">14,59 kr.</div></div>
              <div role="row"><div role="gridcell">Diesel</div><div role="gridcell">12,39 kr.</div></div>
            </div>"#;
        let source = source(
            Company::Ok,
            "http://unused",
            &[FuelType::Oktan95, FuelType::Oktan100, FuelType::Diesel],
        );

        let records = source.parse_page(html).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].fuel_type, FuelType::Oktan100);
        assert_eq!(records[1].price.to_string(), "14.59");
    }

    #[test]
    fn test_page_without_products_is_no_prices() {
        let source = source(Company::Ingo, "http://unused", &[FuelType::Diesel]);
        let result = source.parse_page("<html><body>Vedligeholdelse</body></html>");
        assert!(matches!(result, Err(FetchError::NoPrices { .. })));
    }

    #[test]
    fn test_garbled_price_is_parse_error() {
        let html = r"<table><tr><td></td><td>Diesel</td><td>ring for pris</td></tr></table>";
        let source = source(Company::Ingo, "http://unused", &[FuelType::Diesel]);
        let result = source.parse_page(html);
        assert!(matches!(result, Err(FetchError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_fetch_from_server() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/priser")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(CIRCLE_K_PAGE)
            .create_async()
            .await;

        let source = source(
            Company::CircleK,
            &format!("{}/priser", server.url()),
            &[FuelType::Oktan95Plus],
        );
        let records = source.fetch_prices().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price.to_string(), "14.49");
        mock.assert_async().await;
    }
}
