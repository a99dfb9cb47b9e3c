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
use fuelprices_types::FuelPricesConfig;
use tracing::info;

use crate::error::PublishResult;
use crate::snapshot::AggregatedSnapshot;
use crate::traits::SnapshotPublisher;

/// Writes every slot to the log. Used when no Home Assistant is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPublisher;

#[async_trait]
impl SnapshotPublisher for LoggingPublisher {
    async fn publish(
        &self,
        snapshot: &AggregatedSnapshot,
        config: &FuelPricesConfig,
    ) -> PublishResult<usize> {
        let slots = snapshot.slots(config);
        for slot in &slots {
            match slot.record() {
                Some(record) => info!(
                    "⛽ {} {}: {} {} ({})",
                    slot.key.company.display_name(),
                    slot.key.fuel_type.display_name(),
                    record.price,
                    slot.key.fuel_type.unit().symbol(),
                    record.product_name
                ),
                None => info!(
                    "⛽ {} {}: unavailable",
                    slot.key.company.display_name(),
                    slot.key.fuel_type.display_name()
                ),
            }
        }
        Ok(slots.len())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
