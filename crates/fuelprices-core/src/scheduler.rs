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

//! Periodic refresh loop: fetch all companies, aggregate, swap, publish

use futures_util::future::join_all;
use fuelprices_types::FuelPricesConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::aggregator::{FetchOutcome, aggregate};
use crate::metrics::FuelPricesMetrics;
use crate::snapshot::{AggregatedSnapshot, SnapshotStore};
use crate::traits::{PriceSource, SnapshotPublisher, SourceFactory};

/// Drives refresh cycles.
///
/// Cycles run strictly one after another. A tick that fires while a cycle is
/// still running is skipped rather than queued.
pub struct RefreshScheduler {
    config: FuelPricesConfig,
    factory: SourceFactory,
    sources: Vec<Arc<dyn PriceSource>>,
    publishers: Vec<Arc<dyn SnapshotPublisher>>,
    store: SnapshotStore,
    metrics: Option<FuelPricesMetrics>,
}

impl fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        let publishers: Vec<&str> = self.publishers.iter().map(|p| p.name()).collect();
        f.debug_struct("RefreshScheduler")
            .field("config", &self.config)
            .field("sources", &sources)
            .field("publishers", &publishers)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl RefreshScheduler {
    pub fn new(config: FuelPricesConfig, factory: SourceFactory, store: SnapshotStore) -> Self {
        let sources = factory(&config);
        Self {
            config,
            factory,
            sources,
            publishers: Vec::new(),
            store,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn SnapshotPublisher>) -> Self {
        self.publishers.push(publisher);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: FuelPricesMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &FuelPricesConfig {
        &self.config
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Replace the configuration and rebuild the sources for it
    pub fn apply_config(&mut self, config: FuelPricesConfig) {
        self.sources = (self.factory)(&config);
        info!(
            "🔄 Configuration reloaded: {} companies, {} fuel types, every {}s",
            config.companies.len(),
            config.fuel_types.len(),
            config.update_interval_secs
        );
        self.config = config;
    }

    /// Run one complete cycle and return the snapshot it published.
    ///
    /// All sources are fetched concurrently. A failing company is logged and
    /// left out; it never aborts the cycle or delays the other companies.
    pub async fn run_cycle(&self) -> Arc<AggregatedSnapshot> {
        let started = Instant::now();
        debug!("Starting refresh cycle for {} sources", self.sources.len());

        let outcomes: Vec<FetchOutcome> = join_all(self.sources.iter().map(|source| async move {
            FetchOutcome::new(source.company(), source.fetch_prices().await)
        }))
        .await;

        for outcome in &outcomes {
            match &outcome.result {
                Ok(records) => debug!("{}: fetched {} prices", outcome.company, records.len()),
                Err(e) => {
                    warn!("⚠️ Fetch failed: {e}");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_fetch_failure(outcome.company);
                    }
                }
            }
        }

        let snapshot = self.store.replace(aggregate(&outcomes, &self.config));

        for publisher in &self.publishers {
            match publisher.publish(&snapshot, &self.config).await {
                Ok(written) => debug!("Publisher '{}' wrote {written} slots", publisher.name()),
                Err(e) => warn!("⚠️ {e}"),
            }
        }

        let elapsed = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.record_cycle(elapsed, &snapshot, &self.config);
        }

        info!(
            "✅ Refresh cycle #{} done in {:.1}s: {} prices, {} failed companies",
            snapshot.version,
            elapsed.as_secs_f64(),
            snapshot.len(),
            snapshot.failed_companies().len()
        );

        snapshot
    }

    /// Run cycles until `shutdown` fires.
    ///
    /// The first cycle starts immediately. A new configuration on `config_rx`
    /// rebuilds the sources and starts a cycle right away. Shutdown drops a
    /// cycle that is still in flight.
    pub async fn run(
        mut self,
        mut config_rx: watch::Receiver<FuelPricesConfig>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = Self::ticker(self.config.update_interval());
        let mut reload_open = true;

        info!(
            "🚀 Refresh loop started (every {}s)",
            self.config.update_interval_secs
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => break,

                changed = config_rx.changed(), if reload_open => {
                    if changed.is_err() {
                        reload_open = false;
                        continue;
                    }
                    let config = config_rx.borrow_and_update().clone();
                    self.apply_config(config);
                    ticker = Self::ticker(self.config.update_interval());
                }

                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => {
                            info!("Dropping in-flight refresh cycle");
                            break;
                        }
                        _ = self.run_cycle() => {}
                    }
                }
            }
        }

        info!("🛑 Refresh loop stopped");
    }

    pub fn spawn(
        self,
        config_rx: watch::Receiver<FuelPricesConfig>,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(config_rx, shutdown))
    }

    fn ticker(period: Duration) -> Interval {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, FetchResult, PublishError, PublishResult};
    use async_trait::async_trait;
    use chrono::Utc;
    use fuelprices_types::{Company, FuelType, PriceKey, PriceRecord};
    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    struct StaticSource {
        company: Company,
        fail: bool,
        delay: Duration,
        calls: Arc<Mutex<Vec<Instant>>>,
    }

    #[async_trait]
    impl PriceSource for StaticSource {
        fn company(&self) -> Company {
            self.company
        }

        async fn fetch_prices(&self) -> FetchResult<Vec<PriceRecord>> {
            self.calls.lock().push(Instant::now());
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(FetchError::NoPrices {
                    company: self.company,
                });
            }
            Ok(vec![PriceRecord::new(
                self.company,
                FuelType::Diesel,
                "Diesel",
                Decimal::new(1249, 2),
                Utc::now(),
            )])
        }
    }

    struct Recorder {
        published: Mutex<Vec<u64>>,
        fail: bool,
    }

    #[async_trait]
    impl SnapshotPublisher for Recorder {
        async fn publish(
            &self,
            snapshot: &AggregatedSnapshot,
            _config: &FuelPricesConfig,
        ) -> PublishResult<usize> {
            self.published.lock().push(snapshot.version);
            if self.fail {
                return Err(PublishError::Failed {
                    publisher: "recorder".to_owned(),
                    reason: "down".to_owned(),
                });
            }
            Ok(snapshot.len())
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn factory(
        failing: &'static [Company],
        delay: Duration,
        calls: Arc<Mutex<Vec<Instant>>>,
    ) -> SourceFactory {
        Arc::new(move |config: &FuelPricesConfig| {
            config
                .companies
                .iter()
                .map(|&company| {
                    Arc::new(StaticSource {
                        company,
                        fail: failing.contains(&company),
                        delay,
                        calls: Arc::clone(&calls),
                    }) as Arc<dyn PriceSource>
                })
                .collect()
        })
    }

    fn config(companies: &[Company], interval: u64) -> FuelPricesConfig {
        FuelPricesConfig::new(companies.iter().copied(), [FuelType::Diesel], interval).unwrap()
    }

    #[tokio::test]
    async fn test_failing_company_does_not_block_cycle() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::new(Recorder {
            published: Mutex::new(Vec::new()),
            fail: false,
        });
        let scheduler = RefreshScheduler::new(
            config(&[Company::Ok, Company::Shell], 3600),
            factory(&[Company::Shell], Duration::ZERO, Arc::clone(&calls)),
            SnapshotStore::new(),
        )
        .with_publisher(recorder.clone());

        let snapshot = scheduler.run_cycle().await;

        assert_eq!(snapshot.version, 1);
        assert!(snapshot.get(PriceKey::new(Company::Ok, FuelType::Diesel)).is_some());
        assert!(snapshot.get(PriceKey::new(Company::Shell, FuelType::Diesel)).is_none());
        assert!(snapshot.failed_companies().contains(&Company::Shell));
        assert_eq!(calls.lock().len(), 2);
        assert_eq!(*recorder.published.lock(), vec![1]);
        assert_eq!(scheduler.store().current().version, 1);
    }

    #[tokio::test]
    async fn test_publisher_failure_keeps_snapshot() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let metrics = FuelPricesMetrics::new().unwrap();
        let scheduler = RefreshScheduler::new(
            config(&[Company::Q8], 3600),
            factory(&[], Duration::ZERO, calls),
            SnapshotStore::new(),
        )
        .with_publisher(Arc::new(Recorder {
            published: Mutex::new(Vec::new()),
            fail: true,
        }))
        .with_metrics(metrics.clone());

        scheduler.run_cycle().await;

        assert_eq!(scheduler.store().current().len(), 1);
        assert!(metrics.encode().unwrap().contains("fuelprices_cycles_total 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_respect_interval() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let scheduler = RefreshScheduler::new(
            config(&[Company::Ok], 300),
            factory(&[], Duration::from_secs(2), Arc::clone(&calls)),
            SnapshotStore::new(),
        );
        let (_config_tx, config_rx) = watch::channel(scheduler.config().clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = scheduler.spawn(config_rx, shutdown_rx);
        tokio::time::sleep(Duration::from_secs(1000)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let calls = calls.lock();
        assert_eq!(calls.len(), 4);
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(300));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cycle_never_overlaps() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let scheduler = RefreshScheduler::new(
            config(&[Company::Ok], 60),
            factory(&[], Duration::from_secs(150), Arc::clone(&calls)),
            SnapshotStore::new(),
        );
        let (_config_tx, config_rx) = watch::channel(scheduler.config().clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = scheduler.spawn(config_rx, shutdown_rx);
        tokio::time::sleep(Duration::from_secs(400)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        // Cycles start at 0s, 150s and 300s; missed ticks do not pile up
        let calls = calls.lock();
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(150));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_rebuilds_sources_and_runs_immediately() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let store = SnapshotStore::new();
        let scheduler = RefreshScheduler::new(
            config(&[Company::Ok], 3600),
            factory(&[], Duration::ZERO, Arc::clone(&calls)),
            store.clone(),
        );
        let (config_tx, config_rx) = watch::channel(scheduler.config().clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = scheduler.spawn(config_rx, shutdown_rx);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.lock().len(), 1);

        config_tx
            .send(config(&[Company::Ok, Company::Ingo], 3600))
            .unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(calls.lock().len(), 3);
        let current = store.current();
        assert_eq!(current.version, 2);
        assert!(current.get(PriceKey::new(Company::Ingo, FuelType::Diesel)).is_some());

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_in_flight_cycle() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let store = SnapshotStore::new();
        let scheduler = RefreshScheduler::new(
            config(&[Company::Ok], 3600),
            factory(&[], Duration::from_secs(600), Arc::clone(&calls)),
            store.clone(),
        );
        let (_config_tx, config_rx) = watch::channel(scheduler.config().clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = scheduler.spawn(config_rx, shutdown_rx);
        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(calls.lock().len(), 1);
        assert_eq!(store.current().version, 0);
    }
}
