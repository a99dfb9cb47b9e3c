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

use fuelprices_core::{PriceSource, SourceFactory};
use fuelprices_types::{Company, FuelPricesConfig};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::ProductTable;
use crate::goeasy::GoEasySource;
use crate::http::{SourceClient, build_client};
use crate::shell::ShellSource;
use crate::table::{HtmlTableSource, PageLayout};
use crate::unox::UnoXSource;

/// Scheme and host of each retailer
pub fn default_base_url(company: Company) -> &'static str {
    match company {
        Company::CircleK => "https://www.circlek.dk",
        Company::F24 => "https://www.f24.dk",
        Company::GoOn => "https://goon.nu",
        Company::Ingo => "https://www.ingo.dk",
        Company::Oil => "https://www.oil-tankstationer.dk",
        Company::Ok => "https://www.ok.dk",
        Company::Q8 => "https://www.q8.dk",
        Company::Shell => "https://shellservice.dk",
        Company::UnoX => "https://unoxmobility.dk",
    }
}

/// Path of the scraped page for retailers with a plain HTML price page
fn page_path(company: Company) -> &'static str {
    match company {
        Company::CircleK => "/priser",
        Company::GoOn => "/priser/",
        Company::Ingo => "/br%C3%A6ndstofpriser/aktuelle-br%C3%A6ndstofpriser",
        Company::Oil => "/de-gaeldende-braendstofpriser/",
        Company::Ok => "/offentlig/produkter/braendstof/priser/vejledende-standerpriser",
        Company::F24 | Company::Q8 | Company::Shell | Company::UnoX => "",
    }
}

/// HTTP client and per-company base URL overrides shared by all sources
#[derive(Debug, Clone)]
pub struct SourceSettings {
    client: Client,
    base_urls: BTreeMap<Company, String>,
}

impl SourceSettings {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self::with_client(build_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_urls: BTreeMap::new(),
        }
    }

    /// Point one company at another host, e.g. a local mock server
    #[must_use]
    pub fn with_base_url(mut self, company: Company, base_url: impl Into<String>) -> Self {
        self.base_urls.insert(company, base_url.into());
        self
    }

    pub fn base_url(&self, company: Company) -> &str {
        self.base_urls
            .get(&company)
            .map_or_else(|| default_base_url(company), String::as_str)
    }
}

/// Build one source per configured company.
///
/// A company that offers none of the configured fuel types gets no source;
/// its slots simply stay unavailable.
pub fn create_sources(
    config: &FuelPricesConfig,
    settings: &SourceSettings,
) -> Vec<Arc<dyn PriceSource>> {
    let sources: Vec<Arc<dyn PriceSource>> = config
        .companies
        .iter()
        .filter_map(|&company| create_source(company, config, settings))
        .collect();

    info!(
        "📋 Created {} price sources for {} companies",
        sources.len(),
        config.companies.len()
    );
    sources
}

fn create_source(
    company: Company,
    config: &FuelPricesConfig,
    settings: &SourceSettings,
) -> Option<Arc<dyn PriceSource>> {
    let products = ProductTable::new(company, &config.fuel_types);
    if products.is_empty() {
        debug!("{company} offers none of the configured fuel types, skipping");
        return None;
    }

    let client = SourceClient::new(company, settings.client.clone());
    let base_url = settings.base_url(company);

    let source: Arc<dyn PriceSource> = match company {
        Company::Shell => Arc::new(ShellSource::new(client, base_url, products)),
        Company::F24 | Company::Q8 => Arc::new(GoEasySource::new(client, base_url, products)),
        Company::UnoX => Arc::new(UnoXSource::new(client, base_url, products)),
        Company::CircleK | Company::GoOn | Company::Ingo | Company::Oil | Company::Ok => {
            let layout = PageLayout::for_company(company)?;
            let url = format!("{}{}", base_url.trim_end_matches('/'), page_path(company));
            Arc::new(HtmlTableSource::new(client, url, layout, products))
        }
    };
    Some(source)
}

/// Factory handed to the scheduler so that reloads rebuild the sources
pub fn source_factory(settings: SourceSettings) -> SourceFactory {
    Arc::new(move |config: &FuelPricesConfig| create_sources(config, &settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelprices_types::FuelType;

    #[test]
    fn test_one_source_per_company() {
        let settings = SourceSettings::new().unwrap();
        let sources = create_sources(&FuelPricesConfig::default(), &settings);

        let companies: Vec<Company> = sources.iter().map(|s| s.company()).collect();
        assert_eq!(companies, Company::all());
    }

    #[test]
    fn test_company_without_wanted_products_is_skipped() {
        let settings = SourceSettings::new().unwrap();
        let config =
            FuelPricesConfig::new([Company::GoOn, Company::Shell], [FuelType::Oktan100], 3600)
                .unwrap();

        let sources = create_sources(&config, &settings);

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].company(), Company::Shell);
        assert_eq!(sources[0].name(), "Shell");
    }

    #[test]
    fn test_base_url_override() {
        let settings = SourceSettings::new()
            .unwrap()
            .with_base_url(Company::Ok, "http://127.0.0.1:9999");

        assert_eq!(settings.base_url(Company::Ok), "http://127.0.0.1:9999");
        assert_eq!(settings.base_url(Company::Q8), "https://www.q8.dk");
    }

    #[test]
    fn test_default_urls_match_price_pages() {
        for company in [Company::CircleK, Company::Ingo, Company::Oil, Company::Ok] {
            let url = format!("{}{}", default_base_url(company), page_path(company));
            assert_eq!(url, company.price_page_url());
        }
    }
}
