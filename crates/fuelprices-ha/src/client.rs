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

use crate::errors::{HaError, HaResult};
use crate::types::HaStateUpdate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Core API as proxied by the Supervisor for add-ons
pub const SUPERVISOR_URL: &str = "http://supervisor/core";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8123";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport retries with doubling delay. HTTP error statuses are not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RetryPolicy {
    attempts: u32,
    initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_millis(500),
        }
    }
}

/// Client for the Home Assistant REST API (`/api/states`)
#[derive(Clone)]
pub struct HomeAssistantClient {
    base_url: String,
    token: String,
    http: Client,
    retry: RetryPolicy,
}

impl fmt::Debug for HomeAssistantClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomeAssistantClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HomeAssistantClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> HaResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HaError::ConfigError(format!("cannot build HTTP client: {e}")))?;

        let base_url: String = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
            http,
            retry: RetryPolicy::default(),
        })
    }

    /// Talk to Home Assistant through the Supervisor proxy using `SUPERVISOR_TOKEN`
    pub fn from_supervisor() -> HaResult<Self> {
        let token = std::env::var("SUPERVISOR_TOKEN")
            .map_err(|_| HaError::ConfigError("SUPERVISOR_TOKEN is not set".to_owned()))?;

        info!("🏠 [HA] Using Supervisor API at {SUPERVISOR_URL}");
        Self::new(SUPERVISOR_URL, token)
    }

    /// Build from `[system]` settings, falling back to `HA_BASE_URL` / `HA_TOKEN`.
    /// A missing token is an error, a missing URL means [`DEFAULT_BASE_URL`].
    pub fn from_config(ha_base_url: Option<String>, ha_token: Option<String>) -> HaResult<Self> {
        let Some(token) = ha_token.or_else(|| std::env::var("HA_TOKEN").ok()) else {
            return Err(HaError::ConfigError(
                "no ha_token in config and HA_TOKEN is not set".to_owned(),
            ));
        };
        let base_url = ha_base_url
            .or_else(|| std::env::var("HA_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        info!("🏠 [HA] Using Home Assistant at {base_url}");
        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.retry = RetryPolicy {
            attempts: max_retries.max(1),
            initial_delay: retry_delay,
        };
        self
    }

    fn state_url(&self, entity_id: &str) -> HaResult<String> {
        validate_entity_id(entity_id)?;
        Ok(format!("{}/api/states/{entity_id}", self.base_url))
    }

    /// Create or overwrite an entity's state and attributes.
    ///
    /// Home Assistant answers 201 when the entity is new and 200 otherwise.
    pub async fn set_state(&self, entity_id: &str, update: &HaStateUpdate) -> HaResult<()> {
        let url = self.state_url(entity_id)?;
        debug!("📝 [HA STATE] {entity_id} = '{}'", update.state);
        trace!("   Attributes: {:?}", update.attributes);

        let response = self.send(|| self.http.post(&url).json(update)).await?;
        check_status(entity_id, response).await
    }

    /// `true` when `GET /api/` answers with a success status. Never retried.
    pub async fn ping(&self) -> HaResult<bool> {
        let url = format!("{}/api/", self.base_url);

        match self.http.get(&url).bearer_auth(&self.token).send().await {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                if matches!(
                    response.status(),
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
                ) {
                    return Err(HaError::AuthenticationFailed);
                }
                warn!("⚠️ [HA] Ping answered {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("⚠️ [HA] Ping failed: {e}");
                Ok(false)
            }
        }
    }

    /// Send an authenticated request, rebuilding it for each transport retry
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> HaResult<Response> {
        let mut delay = self.retry.initial_delay;
        let mut attempt = 1;

        loop {
            match build().bearer_auth(&self.token).send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt >= self.retry.attempts => {
                    error!("❌ [HA] Giving up after {attempt} attempts: {e}");
                    return Err(HaError::HttpError(e));
                }
                Err(e) => {
                    warn!(
                        "⚠️ [HA] Attempt {attempt}/{} failed ({e}), retrying in {delay:?}",
                        self.retry.attempts
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }
}

async fn check_status(entity_id: &str, response: Response) -> HaResult<()> {
    match response.status() {
        status if status.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            error!("❌ [HA STATE] Token rejected while writing {entity_id}");
            Err(HaError::AuthenticationFailed)
        }
        status => {
            let message = response.text().await.unwrap_or_default();
            error!("❌ [HA STATE] {entity_id}: status {status}");
            Err(HaError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// `domain.object_id`, both parts lowercase ASCII letters, digits or `_`
fn validate_entity_id(entity_id: &str) -> HaResult<()> {
    let part_ok = |s: &str| {
        !s.is_empty()
            && s.bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    };

    match entity_id.split_once('.') {
        Some((domain, object_id)) if part_ok(domain) && part_ok(object_id) => Ok(()),
        _ => Err(HaError::InvalidEntityId(entity_id.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_set_state_posts_state_and_attributes() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/states/sensor.fuelprices_ok_diesel")
            .match_header("authorization", "Bearer test_token")
            .match_body(Matcher::Json(json!({
                "state": "12.49",
                "attributes": {"currency": "DKK"}
            })))
            .with_status(201)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        let update = HaStateUpdate::new("12.49").attribute("currency", "DKK");
        client
            .set_state("sensor.fuelprices_ok_diesel", &update)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_state_unauthorized() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/states/sensor.fuelprices_ok_diesel")
            .with_status(401)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "bad_token").unwrap();
        let result = client
            .set_state("sensor.fuelprices_ok_diesel", &HaStateUpdate::new("1.00"))
            .await;

        assert!(matches!(result, Err(HaError::AuthenticationFailed)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_state_server_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/states/sensor.fuelprices_ok_diesel")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "token").unwrap();
        let result = client
            .set_state("sensor.fuelprices_ok_diesel", &HaStateUpdate::new("1.00"))
            .await;

        assert!(matches!(
            result,
            Err(HaError::ApiError { status: 500, ref message }) if message == "boom"
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_entity_id_is_rejected() {
        let client = HomeAssistantClient::new("http://localhost", "token").unwrap();
        let result = client
            .set_state("sensor.Fuel Prices", &HaStateUpdate::new("1"))
            .await;

        assert!(matches!(result, Err(HaError::InvalidEntityId(_))));
    }

    #[tokio::test]
    async fn test_ping() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/")
            .match_header("authorization", "Bearer test_token")
            .with_status(200)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        assert!(client.ping().await.unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ping_with_bad_token() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/")
            .with_status(401)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "bad").unwrap();
        assert!(matches!(
            client.ping().await,
            Err(HaError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let client = HomeAssistantClient::new("http://127.0.0.1:1", "token")
            .unwrap()
            .with_retry_config(2, Duration::from_millis(10));

        let result = client
            .set_state("sensor.fuelprices_ok_diesel", &HaStateUpdate::new("1"))
            .await;

        assert!(matches!(result, Err(HaError::HttpError(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = HomeAssistantClient::new("http://homeassistant.local:8123/", "t").unwrap();
        assert_eq!(client.base_url(), "http://homeassistant.local:8123");
    }

    #[test]
    fn test_entity_id_validation() {
        assert!(validate_entity_id("sensor.fuelprices_goon_oktan95plus").is_ok());
        assert!(validate_entity_id("sensor").is_err());
        assert!(validate_entity_id(".diesel").is_err());
        assert!(validate_entity_id("sensor.Diesel").is_err());
    }
}
