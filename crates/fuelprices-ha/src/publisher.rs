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

//! Mirrors every price slot into a Home Assistant sensor

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Europe::Copenhagen;
use fuelprices_core::{AggregatedSnapshot, PriceSlot, PublishError, PublishResult, SnapshotPublisher};
use fuelprices_types::{CURRENCY, FuelPricesConfig, PriceKey};
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::HomeAssistantClient;
use crate::types::{HaStateUpdate, UNAVAILABLE};

pub const ATTRIBUTION: &str = "Prices from the retailers' public price lists";

const LAST_UPDATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// `sensor.fuelprices_<company>_<fuel>`
pub fn entity_id(key: PriceKey) -> String {
    format!(
        "sensor.fuelprices_{}_{}",
        key.company.key(),
        key.fuel_type.slug()
    )
}

fn format_last_update(at: DateTime<Utc>) -> String {
    at.with_timezone(&Copenhagen)
        .format(LAST_UPDATE_FORMAT)
        .to_string()
}

/// Build the state and attributes for one slot.
///
/// `published_at` stamps slots that have no record in this snapshot.
pub fn state_update(slot: &PriceSlot<'_>, published_at: DateTime<Utc>) -> HaStateUpdate {
    let PriceKey { company, fuel_type } = slot.key;
    let icon = if fuel_type.is_electric() {
        "mdi:ev-station"
    } else {
        "mdi:gas-station"
    };

    let base = match slot.record() {
        Some(record) => HaStateUpdate::new(format!("{:.2}", record.price))
            .attribute("product_name", record.product_name.as_str())
            .attribute("price_type", record.price_type.to_string())
            .attribute("last_update", format_last_update(record.fetched_at)),
        None => HaStateUpdate::new(UNAVAILABLE)
            .attribute("last_update", format_last_update(published_at)),
    };

    base.attribute(
        "friendly_name",
        format!("{} {}", company.display_name(), fuel_type.display_name()),
    )
    .attribute("unit_of_measurement", fuel_type.unit().symbol())
    .attribute("currency", CURRENCY)
    .attribute("icon", icon)
    .attribute("company", company.display_name())
    .attribute("fuel_type", fuel_type.key())
    .attribute("url", company.price_page_url())
    .attribute("attribution", ATTRIBUTION)
}

/// Publishes snapshots as Home Assistant sensor states
#[derive(Debug, Clone)]
pub struct HaSensorPublisher {
    client: Arc<HomeAssistantClient>,
}

impl HaSensorPublisher {
    pub fn new(client: Arc<HomeAssistantClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnapshotPublisher for HaSensorPublisher {
    async fn publish(
        &self,
        snapshot: &AggregatedSnapshot,
        config: &FuelPricesConfig,
    ) -> PublishResult<usize> {
        let published_at = snapshot.published_at.unwrap_or_else(Utc::now);
        let slots = snapshot.slots(config);
        let total = slots.len();
        let mut written = 0;

        for slot in &slots {
            let entity = entity_id(slot.key);
            match self
                .client
                .set_state(&entity, &state_update(slot, published_at))
                .await
            {
                Ok(()) => written += 1,
                Err(e) => warn!("⚠️ [HA STATE] Failed to update {entity}: {e}"),
            }
        }

        info!("✅ [HA STATE] Updated {written}/{total} fuel price sensors");

        match written {
            w if w == total => Ok(written),
            0 => Err(PublishError::Failed {
                publisher: self.name().to_owned(),
                reason: format!("none of {total} sensors could be written"),
            }),
            _ => Err(PublishError::Partial {
                publisher: self.name().to_owned(),
                written,
                total,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "home-assistant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fuelprices_core::{FetchOutcome, SlotValue, aggregate};
    use fuelprices_types::{Company, FuelType, PriceRecord, PriceType};
    use mockito::{Matcher, Server};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::time::Duration;

    fn at() -> DateTime<Utc> {
        // 13:05:09 in Copenhagen (CET)
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 5, 9).unwrap()
    }

    #[test]
    fn test_entity_id() {
        assert_eq!(
            entity_id(PriceKey::new(Company::Shell, FuelType::Oktan95)),
            "sensor.fuelprices_shell_oktan95"
        );
        assert_eq!(
            entity_id(PriceKey::new(Company::CircleK, FuelType::DieselPlus)),
            "sensor.fuelprices_circlek_dieselplus"
        );
    }

    #[test]
    fn test_available_slot_state() {
        let record = PriceRecord::new(
            Company::GoOn,
            FuelType::Oktan95,
            "Blyfri 95",
            Decimal::new(135, 1),
            at(),
        )
        .with_price_type(PriceType::List);
        let slot = PriceSlot {
            key: record.key(),
            value: SlotValue::Available(&record),
        };

        let update = state_update(&slot, at());

        assert_eq!(update.state, "13.50");
        assert_eq!(update.attributes["friendly_name"], "Go' on Oktan 95");
        assert_eq!(update.attributes["unit_of_measurement"], "kr/L");
        assert_eq!(update.attributes["currency"], "DKK");
        assert_eq!(update.attributes["icon"], "mdi:gas-station");
        assert_eq!(update.attributes["product_name"], "Blyfri 95");
        assert_eq!(update.attributes["price_type"], "list");
        assert_eq!(update.attributes["last_update"], "01/03/2025, 13:05:09");
    }

    #[test]
    fn test_unavailable_slot_state() {
        let slot = PriceSlot {
            key: PriceKey::new(Company::Q8, FuelType::Quickcharge),
            value: SlotValue::Unavailable,
        };

        let update = state_update(&slot, at());

        assert_eq!(update.state, UNAVAILABLE);
        assert_eq!(update.attributes["unit_of_measurement"], "kr/kWh");
        assert_eq!(update.attributes["icon"], "mdi:ev-station");
        assert!(!update.attributes.contains_key("product_name"));
    }

    #[tokio::test]
    async fn test_publish_writes_every_slot() {
        let mut server = Server::new_async().await;
        let ok = server
            .mock("POST", "/api/states/sensor.fuelprices_ok_diesel")
            .match_body(Matcher::PartialJson(json!({
                "state": "9.80",
                "attributes": {"company": "OK", "fuel_type": "diesel"}
            })))
            .with_status(200)
            .create_async()
            .await;
        let shell = server
            .mock("POST", "/api/states/sensor.fuelprices_shell_diesel")
            .match_body(Matcher::PartialJson(json!({"state": "unavailable"})))
            .with_status(201)
            .create_async()
            .await;

        let config =
            FuelPricesConfig::new([Company::Ok, Company::Shell], [FuelType::Diesel], 3600)
                .unwrap();
        let outcomes = vec![FetchOutcome::new(
            Company::Ok,
            Ok(vec![PriceRecord::new(
                Company::Ok,
                FuelType::Diesel,
                "Diesel",
                Decimal::new(98, 1),
                at(),
            )]),
        )];
        let snapshot = aggregate(&outcomes, &config);

        let client = HomeAssistantClient::new(server.url(), "token").unwrap();
        let publisher = HaSensorPublisher::new(Arc::new(client));
        let written = publisher.publish(&snapshot, &config).await.unwrap();

        assert_eq!(written, 2);
        ok.assert_async().await;
        shell.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_entity_does_not_stop_others() {
        let mut server = Server::new_async().await;
        let _broken = server
            .mock("POST", "/api/states/sensor.fuelprices_ok_oktan95")
            .with_status(500)
            .create_async()
            .await;
        let diesel = server
            .mock("POST", "/api/states/sensor.fuelprices_ok_diesel")
            .with_status(200)
            .create_async()
            .await;

        let config = FuelPricesConfig::new(
            [Company::Ok],
            [FuelType::Oktan95, FuelType::Diesel],
            3600,
        )
        .unwrap();
        let client = HomeAssistantClient::new(server.url(), "token")
            .unwrap()
            .with_retry_config(1, Duration::from_millis(1));
        let publisher = HaSensorPublisher::new(Arc::new(client));

        let result = publisher
            .publish(&AggregatedSnapshot::default(), &config)
            .await;

        assert!(matches!(
            result,
            Err(PublishError::Partial {
                written: 1,
                total: 2,
                ..
            })
        ));
        diesel.assert_async().await;
    }
}
