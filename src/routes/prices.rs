//! # routes::prices
//!
//! Axum route handlers for the price read API.
//!
//! ## Endpoints
//!
//! | Method | Path                     | Description                                   |
//! |--------|--------------------------|-----------------------------------------------|
//! | GET    | `/api/v1/prices/all`     | Every tick for `ticker`, oldest first         |
//! | GET    | `/api/v1/prices/latest`  | Most recent tick for `ticker` (404 if none)   |
//! | GET    | `/api/v1/prices/filter`  | Ticks with `date_from <= timestamp <= date_to`|
//!
//! `ticker` is required everywhere. `date_from` / `date_to` are UNIX seconds
//! and each may be omitted.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::PriceTick,
    query::TickList,
    state::SharedState,
};

#[derive(Debug, Deserialize)]
pub struct TickerParams {
    pub ticker: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    pub ticker:    Option<String>,
    pub date_from: Option<i64>,
    pub date_to:   Option<i64>,
}

fn params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(p)| p)
        .map_err(|e| AppError::Validation(e.body_text()))
}

// ─── GET /api/v1/prices/all ───────────────────────────────────────────────────

pub async fn get_all_prices(
    State(state): State<SharedState>,
    query: Result<Query<TickerParams>, QueryRejection>,
) -> Result<Json<TickList>, AppError> {
    let p = params(query)?;
    Ok(Json(state.prices.all(p.ticker.as_deref()).await?))
}

// ─── GET /api/v1/prices/latest ────────────────────────────────────────────────

pub async fn get_latest_price(
    State(state): State<SharedState>,
    query: Result<Query<TickerParams>, QueryRejection>,
) -> Result<Json<PriceTick>, AppError> {
    let p = params(query)?;
    Ok(Json(state.prices.latest(p.ticker.as_deref()).await?))
}

// ─── GET /api/v1/prices/filter ────────────────────────────────────────────────

pub async fn get_prices_by_date(
    State(state): State<SharedState>,
    query: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<TickList>, AppError> {
    let p = params(query)?;
    let list = state
        .prices
        .filter(p.ticker.as_deref(), p.date_from, p.date_to)
        .await?;
    Ok(Json(list))
}
