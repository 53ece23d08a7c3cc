//! # query — Query Service
//!
//! Read side of the service. Validates the ticker against the supported set
//! **before** the store is touched, then forwards to one of the three
//! [`TickStore`] reads and shapes the result. No other logic lives here.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::models::{PriceTick, TickerSet};
use crate::store::{StoreError, TickStore};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("query parameter 'ticker' is required")]
    MissingTicker,

    #[error("unsupported ticker '{ticker}'. Supported tickers: {supported}")]
    UnsupportedTicker { ticker: String, supported: String },
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Valid ticker, no data. Only `latest` reports this; list reads return
    /// an empty list instead.
    #[error("no prices stored for {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// List response: `{"ticker", "count", "data"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickList {
    pub ticker: String,
    pub count:  usize,
    pub data:   Vec<PriceTick>,
}

impl TickList {
    fn new(ticker: &str, data: Vec<PriceTick>) -> Self {
        Self {
            ticker: ticker.to_string(),
            count:  data.len(),
            data,
        }
    }
}

#[derive(Clone)]
pub struct PriceQueryService {
    store:   Arc<dyn TickStore>,
    tickers: TickerSet,
}

impl PriceQueryService {
    pub fn new(store: Arc<dyn TickStore>, tickers: TickerSet) -> Self {
        Self { store, tickers }
    }

    pub fn tickers(&self) -> &TickerSet {
        &self.tickers
    }

    pub fn validate<'a>(&self, ticker: Option<&'a str>) -> Result<&'a str, ValidationError> {
        let ticker = ticker
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingTicker)?;

        if !self.tickers.contains(ticker) {
            return Err(ValidationError::UnsupportedTicker {
                ticker:    ticker.to_string(),
                supported: self.tickers.to_string(),
            });
        }
        Ok(ticker)
    }

    pub async fn all(&self, ticker: Option<&str>) -> Result<TickList, QueryError> {
        let ticker = self.validate(ticker)?;
        let data = self.store.all_by_ticker(ticker).await?;
        Ok(TickList::new(ticker, data))
    }

    pub async fn latest(&self, ticker: Option<&str>) -> Result<PriceTick, QueryError> {
        let ticker = self.validate(ticker)?;
        self.store
            .latest_by_ticker(ticker)
            .await?
            .ok_or_else(|| QueryError::NotFound(ticker.to_string()))
    }

    pub async fn filter(
        &self,
        ticker: Option<&str>,
        date_from: Option<i64>,
        date_to: Option<i64>,
    ) -> Result<TickList, QueryError> {
        let ticker = self.validate(ticker)?;
        let data = self.store.range_by_ticker(ticker, date_from, date_to).await?;
        Ok(TickList::new(ticker, data))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
