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

mod config;
mod status;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use fuelprices_core::{
    FuelPricesMetrics, LoggingPublisher, RefreshScheduler, SnapshotPublisher, SnapshotStore,
};
use fuelprices_ha::{HaSensorPublisher, HomeAssistantClient};
use fuelprices_sources::{SourceSettings, source_factory};
use fuelprices_types::FuelPricesConfig;

use crate::config::{AppConfig, SystemConfig};
use crate::status::StatusState;

/// Danish fuel and EV charging prices for Home Assistant
#[derive(Debug, Parser)]
#[command(name = "fuelprices", version)]
struct Args {
    /// Configuration file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single refresh cycle, print the prices and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = AppConfig::load(args.config.as_deref())?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.system.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    info!("✅ Loaded configuration from {source}");
    config.validate_detailed().log_warnings();
    log_summary(&config.fuelprices);

    let metrics = FuelPricesMetrics::new().context("Failed to register metrics")?;
    let settings = SourceSettings::new().context("Failed to build HTTP client")?;
    let store = SnapshotStore::new();
    let scheduler = RefreshScheduler::new(
        config.fuelprices.clone(),
        source_factory(settings),
        store.clone(),
    )
    .with_metrics(metrics.clone());

    if args.once {
        let snapshot = scheduler.run_cycle().await;
        for slot in snapshot.slots(&config.fuelprices) {
            let price = slot
                .record()
                .map_or_else(|| "unavailable".to_owned(), |r| format!("{:.2}", r.price));
            let product = slot.record().map_or("", |r| r.product_name.as_str());
            println!(
                "{:10} {:12} {:23} {:>6}",
                slot.key.company.display_name(),
                slot.key.fuel_type.display_name(),
                product,
                price
            );
        }
        return Ok(());
    }

    let scheduler = scheduler.with_publisher(create_publisher(&config.system).await);

    let (config_tx, config_rx) = watch::channel(config.fuelprices.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    if config.system.status_port != 0 {
        let state = StatusState {
            store: store.clone(),
            metrics,
            config: config_rx.clone(),
        };
        let port = config.system.status_port;
        tokio::spawn(async move {
            if let Err(e) = status::start_status_server(state, port).await {
                error!("❌ Status API failed: {e:#}");
            }
        });
    }

    #[cfg(unix)]
    tokio::spawn(reload_on_sighup(args.config.clone(), config_tx));
    #[cfg(not(unix))]
    drop(config_tx);

    let handle = scheduler.spawn(config_rx, shutdown_rx);
    info!("🚀 FuelPrices DK running");

    wait_for_shutdown().await;
    info!("🛑 Shutting down");
    if shutdown_tx.send(true).is_err() {
        warn!("Scheduler already stopped");
    }
    handle.await.context("Scheduler task panicked")?;

    Ok(())
}

fn log_summary(config: &FuelPricesConfig) {
    let companies: Vec<&str> = config.companies.iter().map(|c| c.display_name()).collect();
    let fuel_types: Vec<&str> = config.fuel_types.iter().map(|f| f.key()).collect();
    info!("📋 Configuration Summary:");
    info!("   Companies: {}", companies.join(", "));
    info!("   Fuel types: {}", fuel_types.join(", "));
    info!("   Update interval: {}s", config.update_interval_secs);
}

/// Home Assistant sensors when reachable, otherwise log-only output
async fn create_publisher(system: &SystemConfig) -> Arc<dyn SnapshotPublisher> {
    let client = if std::env::var("SUPERVISOR_TOKEN").is_ok() {
        HomeAssistantClient::from_supervisor()
    } else {
        HomeAssistantClient::from_config(system.ha_base_url.clone(), system.ha_token.clone())
    };

    match client {
        Ok(client) => {
            match client.ping().await {
                Ok(true) => info!("✅ Connected to Home Assistant at {}", client.base_url()),
                Ok(false) => warn!(
                    "⚠️ Home Assistant at {} did not answer, will keep trying each cycle",
                    client.base_url()
                ),
                Err(e) => warn!("⚠️ Home Assistant ping failed: {e}"),
            }
            Arc::new(HaSensorPublisher::new(Arc::new(client)))
        }
        Err(e) => {
            warn!("⚠️ Home Assistant not configured ({e}), prices will only be logged");
            Arc::new(LoggingPublisher)
        }
    }
}

#[cfg(unix)]
async fn reload_on_sighup(path: Option<PathBuf>, config_tx: watch::Sender<FuelPricesConfig>) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            warn!("⚠️ SIGHUP reload unavailable: {e}");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        match AppConfig::load(path.as_deref()) {
            Ok((config, source)) => {
                config.validate_detailed().log_warnings();
                let changed = config_tx.send_if_modified(|current| {
                    if *current == config.fuelprices {
                        false
                    } else {
                        *current = config.fuelprices.clone();
                        true
                    }
                });
                if changed {
                    info!("🔄 Reloaded configuration from {source}");
                } else {
                    info!("Configuration unchanged after SIGHUP");
                }
            }
            Err(e) => error!("❌ Reload failed, keeping previous configuration: {e:#}"),
        }
    }
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
