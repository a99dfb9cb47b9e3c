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

use fuelprices_types::{Company, FuelPricesConfig, PriceRecord};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

use crate::error::FetchResult;
use crate::snapshot::AggregatedSnapshot;

/// Result of one company's fetch within a cycle
#[derive(Debug)]
pub struct FetchOutcome {
    pub company: Company,
    pub result: FetchResult<Vec<PriceRecord>>,
}

impl FetchOutcome {
    pub fn new(company: Company, result: FetchResult<Vec<PriceRecord>>) -> Self {
        Self { company, result }
    }
}

/// Fold all fetch outcomes of a cycle into a snapshot.
///
/// Pure filter/project: only records whose company and fuel type are both
/// configured survive, the first record per (company, fuel type) wins, and
/// failed companies are listed but contribute no entries. Outcomes for
/// companies outside the configuration are ignored entirely.
pub fn aggregate(outcomes: &[FetchOutcome], config: &FuelPricesConfig) -> AggregatedSnapshot {
    let mut entries = BTreeMap::new();
    let mut failed = BTreeSet::new();

    for outcome in outcomes {
        if !config.companies.contains(&outcome.company) {
            trace!("Ignoring outcome for unconfigured company {}", outcome.company);
            continue;
        }

        match &outcome.result {
            Ok(records) => {
                for record in records {
                    let key = record.key();
                    if !config.tracks(key) {
                        trace!("Dropping untracked record {key}");
                        continue;
                    }
                    entries.entry(key).or_insert_with(|| record.clone());
                }
            }
            Err(_) => {
                failed.insert(outcome.company);
            }
        }
    }

    debug!(
        "Aggregated {} prices, {} failed companies",
        entries.len(),
        failed.len()
    );

    AggregatedSnapshot::from_parts(entries, failed)
}
