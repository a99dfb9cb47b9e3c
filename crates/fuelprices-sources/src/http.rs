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

use fuelprices_core::{FetchError, FetchResult};
use fuelprices_types::Company;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};

/// Several retailers reject requests without a desktop browser agent
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.149 Safari/537.36";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the HTTP client shared by all sources
pub fn build_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Thin wrapper that maps transport and status failures to [`FetchError`]
#[derive(Debug, Clone)]
pub struct SourceClient {
    company: Company,
    client: Client,
}

impl SourceClient {
    pub fn new(company: Company, client: Client) -> Self {
        Self { company, client }
    }

    pub fn company(&self) -> Company {
        self.company
    }

    pub async fn get_text(&self, url: &str) -> FetchResult<String> {
        debug!("🌐 [FETCH] {} GET {}", self.company, url);
        self.send(url, self.client.get(url)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> FetchResult<String> {
        debug!("🌐 [FETCH] {} POST {}", self.company, url);
        self.send(url, self.client.post(url).json(body)).await
    }

    pub async fn post_raw(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: impl Into<String>,
    ) -> FetchResult<String> {
        debug!("🌐 [FETCH] {} POST {}", self.company, url);
        let request = headers
            .iter()
            .fold(self.client.post(url), |req, (name, value)| req.header(*name, *value))
            .body(body.into());
        self.send(url, request).await
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> FetchResult<String> {
        let response = request.send().await.map_err(|e| self.network(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                company: self.company,
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.network(url, &e))?;
        trace!("   {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn network(&self, url: &str, error: &reqwest::Error) -> FetchError {
        let reason = if error.is_timeout() {
            format!("timed out after {}s", REQUEST_TIMEOUT.as_secs())
        } else {
            error.to_string()
        };
        FetchError::Network {
            company: self.company,
            url: url.to_owned(),
            reason,
        }
    }
}
