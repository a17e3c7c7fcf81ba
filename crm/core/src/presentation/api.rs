// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP liveness endpoint served next to the gRPC port.

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct HealthState {
    pub storage: &'static str,
    pub bus: &'static str,
}

pub fn app(storage: &'static str, bus: &'static str) -> Router {
    let state = Arc::new(HealthState { storage, bus });

    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<Arc<HealthState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.storage,
        "bus": state.bus,
    }))
}
