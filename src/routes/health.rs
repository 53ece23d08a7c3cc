//! # routes::health
//!
//! Liveness and ingestion status. Never touches the tick store.

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::state::SharedState;

// ─── GET / ────────────────────────────────────────────────────────────────────

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Deribit Index Price API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ─── GET /health ──────────────────────────────────────────────────────────────

/// Ingestion counters let a dashboard spot a stalled scheduler (counter stops
/// moving) or a failing source (fetch_failures climbing).
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "ok":                  true,
        "tickers":             state.prices.tickers(),
        "fetch_interval_secs": state.fetch_interval.as_secs(),
        "ingest":              state.ingest.snapshot(),
    }))
}
