//! # state
//!
//! Shared application state injected into every Axum handler.
//!
//! The read path only sees the [`PriceQueryService`] and a read-only view of
//! the ingestion counters; it holds no handle that could write ticks.

use std::sync::Arc;
use std::time::Duration;

use crate::engine::IngestStats;
use crate::query::PriceQueryService;

// ─── AppState ─────────────────────────────────────────────────────────────────

pub struct AppState {
    pub prices:         PriceQueryService,
    /// Counters fed by the ingestion cycle, reported by `/health`.
    pub ingest:         Arc<IngestStats>,
    pub fetch_interval: Duration,
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(
    prices: PriceQueryService,
    ingest: Arc<IngestStats>,
    fetch_interval: Duration,
) -> SharedState {
    Arc::new(AppState { prices, ingest, fetch_interval })
}
