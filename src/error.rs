//! # error
//!
//! Centralised HTTP error type.
//!
//! Every handler returns `Result<_, AppError>`. Axum's `IntoResponse` impl
//! converts these into structured JSON error bodies so clients always get a
//! machine-readable response even on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::query::{QueryError, ValidationError};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// The request named a ticker outside the supported set.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A required query parameter is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Valid request, nothing stored for it yet.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Validation(v @ ValidationError::MissingTicker) => {
                AppError::Validation(v.to_string())
            }
            QueryError::Validation(v @ ValidationError::UnsupportedTicker { .. }) => {
                AppError::BadRequest(v.to_string())
            }
            QueryError::NotFound(ticker) => {
                AppError::NotFound(format!("no prices found for ticker {ticker}"))
            }
            QueryError::Store(e) => AppError::Storage(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Storage error while serving request");
                let status = if err.is_unavailable() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, "storage error".to_string())
            }
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
