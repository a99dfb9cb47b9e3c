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

use fuelprices_types::{Company, FuelPricesConfig};
use prometheus::{
    GaugeVec, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use rust_decimal::prelude::ToPrimitive;
use std::time::Duration;

use crate::snapshot::AggregatedSnapshot;

/// Prometheus metrics for the refresh loop, exported on `/metrics`
#[derive(Debug, Clone)]
pub struct FuelPricesMetrics {
    registry: Registry,
    cycles_total: IntCounter,
    fetch_failures_total: IntCounterVec,
    cycle_duration: Histogram,
    price: GaugeVec,
    available_slots: IntGauge,
}

impl FuelPricesMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let cycles_total = IntCounter::new(
            "fuelprices_cycles_total",
            "Total number of completed refresh cycles",
        )?;
        let fetch_failures_total = IntCounterVec::new(
            Opts::new(
                "fuelprices_fetch_failures_total",
                "Total number of failed company fetches",
            ),
            &["company"],
        )?;
        let cycle_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fuelprices_cycle_duration_seconds",
                "Wall time of one refresh cycle",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        let price = GaugeVec::new(
            Opts::new("fuelprices_price_dkk", "Last published price in DKK"),
            &["company", "fuel_type"],
        )?;
        let available_slots = IntGauge::new(
            "fuelprices_available_slots",
            "Configured slots holding a price in the current snapshot",
        )?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(fetch_failures_total.clone()))?;
        registry.register(Box::new(cycle_duration.clone()))?;
        registry.register(Box::new(price.clone()))?;
        registry.register(Box::new(available_slots.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            fetch_failures_total,
            cycle_duration,
            price,
            available_slots,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_fetch_failure(&self, company: Company) {
        self.fetch_failures_total
            .with_label_values(&[company.key()])
            .inc();
    }

    /// Record a finished cycle and mirror the snapshot into the price gauges
    pub fn record_cycle(
        &self,
        elapsed: Duration,
        snapshot: &AggregatedSnapshot,
        config: &FuelPricesConfig,
    ) {
        self.cycles_total.inc();
        self.cycle_duration.observe(elapsed.as_secs_f64());

        // Drop series for slots that went unavailable or were unconfigured
        self.price.reset();
        let mut available = 0_i64;
        for slot in snapshot.slots(config) {
            if let Some(record) = slot.record()
                && let Some(value) = record.price.to_f64()
            {
                self.price
                    .with_label_values(&[slot.key.company.key(), slot.key.fuel_type.slug()])
                    .set(value);
                available += 1;
            }
        }
        self.available_slots.set(available);
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}
