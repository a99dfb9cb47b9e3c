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

//! Refresh engine: source and publisher seams, aggregation, the snapshot
//! store and the periodic scheduler.

pub mod aggregator;
pub mod error;
pub mod metrics;
pub mod publisher;
pub mod scheduler;
pub mod snapshot;
pub mod traits;

pub use aggregator::{FetchOutcome, aggregate};
pub use error::{FetchError, FetchResult, PublishError, PublishResult};
pub use metrics::FuelPricesMetrics;
pub use publisher::LoggingPublisher;
pub use scheduler::RefreshScheduler;
pub use snapshot::{AggregatedSnapshot, PriceSlot, SlotValue, SnapshotStore};
pub use traits::{PriceSource, SnapshotPublisher, SourceFactory};
