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
use fuelprices_types::{Company, FuelPricesConfig, PriceRecord};
use std::sync::Arc;

use crate::error::{FetchResult, PublishResult};
use crate::snapshot::AggregatedSnapshot;

/// Retrieves one company's current price list.
///
/// One implementation exists per retrieval format. Implementations share no
/// mutable state and can run concurrently.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Company this source fetches for
    fn company(&self) -> Company;

    /// Fetch current prices. Performs outbound network I/O on every call.
    async fn fetch_prices(&self) -> FetchResult<Vec<PriceRecord>>;

    /// Get data source name for logging
    fn name(&self) -> &str {
        self.company().display_name()
    }
}

/// Receives every new snapshot (Home Assistant, log output, tests)
#[async_trait]
pub trait SnapshotPublisher: Send + Sync {
    /// Publish one value per configured slot. Returns the number of slots written.
    async fn publish(
        &self,
        snapshot: &AggregatedSnapshot,
        config: &FuelPricesConfig,
    ) -> PublishResult<usize>;

    fn name(&self) -> &str;
}

/// Builds the set of sources for a configuration; called again on reload
pub type SourceFactory =
    Arc<dyn Fn(&FuelPricesConfig) -> Vec<Arc<dyn PriceSource>> + Send + Sync>;
