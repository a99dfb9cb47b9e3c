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

//! The published price snapshot and its single-writer store

use chrono::{DateTime, Utc};
use fuelprices_types::{Company, FuelPricesConfig, PriceKey, PriceRecord};
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Complete set of known prices for one cycle.
///
/// Built in full by the aggregator, then swapped into the [`SnapshotStore`].
/// Never mutated after it becomes visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedSnapshot {
    /// Increments on every swap, 0 for a snapshot that was never stored
    pub version: u64,
    /// Stamped by the store at swap time
    pub published_at: Option<DateTime<Utc>>,
    #[serde(rename = "prices", serialize_with = "serialize_records")]
    entries: BTreeMap<PriceKey, PriceRecord>,
    failed_companies: BTreeSet<Company>,
}

fn serialize_records<S: Serializer>(
    entries: &BTreeMap<PriceKey, PriceRecord>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(entries.values())
}

/// Value of one slot as seen by publishers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotValue<'a> {
    Available(&'a PriceRecord),
    Unavailable,
}

/// One (company, fuel type) pair with its current value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSlot<'a> {
    pub key: PriceKey,
    pub value: SlotValue<'a>,
}

impl PriceSlot<'_> {
    pub fn record(&self) -> Option<&PriceRecord> {
        match self.value {
            SlotValue::Available(record) => Some(record),
            SlotValue::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.value, SlotValue::Available(_))
    }
}

impl AggregatedSnapshot {
    pub(crate) fn from_parts(
        entries: BTreeMap<PriceKey, PriceRecord>,
        failed_companies: BTreeSet<Company>,
    ) -> Self {
        Self {
            version: 0,
            published_at: None,
            entries,
            failed_companies,
        }
    }

    pub fn get(&self, key: PriceKey) -> Option<&PriceRecord> {
        self.entries.get(&key)
    }

    pub fn records(&self) -> impl Iterator<Item = &PriceRecord> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Companies whose fetch failed in the cycle that produced this snapshot
    pub fn failed_companies(&self) -> &BTreeSet<Company> {
        &self.failed_companies
    }

    /// One slot per configured (company, fuel type) pair.
    ///
    /// Pairs without a record are [`SlotValue::Unavailable`]. Stale values from
    /// earlier snapshots are never carried over.
    pub fn slots<'a>(&'a self, config: &FuelPricesConfig) -> Vec<PriceSlot<'a>> {
        config
            .slots()
            .map(|key| PriceSlot {
                key,
                value: self
                    .entries
                    .get(&key)
                    .map_or(SlotValue::Unavailable, SlotValue::Available),
            })
            .collect()
    }
}

/// Holds the currently published snapshot.
///
/// Readers clone the inner `Arc` and never observe a half-built snapshot;
/// the only writer is the scheduler, which swaps in a complete value.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<AggregatedSnapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Arc<AggregatedSnapshot> {
        self.current.read().clone()
    }

    /// Swap in a new snapshot, stamping version and publish time
    pub fn replace(&self, mut snapshot: AggregatedSnapshot) -> Arc<AggregatedSnapshot> {
        let mut guard = self.current.write();
        snapshot.version = guard.version + 1;
        snapshot.published_at = Some(Utc::now());
        let snapshot = Arc::new(snapshot);
        *guard = Arc::clone(&snapshot);
        snapshot
    }
}
