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

//! Read-only HTTP status API over the current snapshot

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use fuelprices_core::{FuelPricesMetrics, SnapshotStore};
use fuelprices_ha::entity_id;
use fuelprices_types::FuelPricesConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct StatusState {
    pub store: SnapshotStore,
    pub metrics: FuelPricesMetrics,
    pub config: watch::Receiver<FuelPricesConfig>,
}

pub fn router(state: StatusState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/prices", get(prices_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Bind `0.0.0.0:<port>` and serve until the process exits
pub async fn start_status_server(state: StatusState, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("🌐 Status API listening on http://{}", listener.local_addr()?);
    serve(listener, state).await
}

pub async fn serve(listener: TcpListener, state: StatusState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_handler(State(state): State<StatusState>) -> impl IntoResponse {
    let snapshot = state.store.current();
    if snapshot.version == 0 {
        (StatusCode::SERVICE_UNAVAILABLE, "STARTING")
    } else if snapshot.is_empty() && !snapshot.failed_companies().is_empty() {
        (StatusCode::SERVICE_UNAVAILABLE, "DEGRADED")
    } else {
        (StatusCode::OK, "OK")
    }
}

async fn prices_handler(State(state): State<StatusState>) -> impl IntoResponse {
    let snapshot = state.store.current();
    let config = state.config.borrow().clone();

    let slots: Vec<Value> = snapshot
        .slots(&config)
        .iter()
        .map(|slot| {
            json!({
                "entity_id": entity_id(slot.key),
                "company": slot.key.company,
                "fuel_type": slot.key.fuel_type,
                "available": slot.is_available(),
                "price": slot.record().map(|r| r.price),
            })
        })
        .collect();

    match serde_json::to_value(snapshot.as_ref()) {
        Ok(mut body) => {
            if let Value::Object(map) = &mut body {
                map.insert("slots".to_owned(), Value::Array(slots));
            }
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            error!("Failed to serialize snapshot: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

async fn metrics_handler(State(state): State<StatusState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            e.to_string(),
        ),
    }
}
