//! HTTP surface: the price read API plus liveness endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::SharedState;

pub mod health;
pub mod prices;

use health::{health_check, root};
use prices::{get_all_prices, get_latest_price, get_prices_by_date};

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/",                      get(root))
        .route("/health",                get(health_check))
        // ── Prices ───────────────────────────────────────────────────────────
        .route("/api/v1/prices/all",     get(get_all_prices))
        .route("/api/v1/prices/latest",  get(get_latest_price))
        .route("/api/v1/prices/filter",  get(get_prices_by_date))
        // ── Middleware ───────────────────────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
