//! # models::tick
//!
//! Defines [`PriceTick`], one stored observation of an index price, and
//! [`NewPriceTick`], the same observation before the store has assigned it an id.
//!
//! Prices are `BigDecimal` end to end: the exchange publishes high-precision
//! index values and the `price_ticks.price` column is `NUMERIC(20, 8)`, so no
//! float ever sits between the wire and the database.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A persisted price observation.
///
/// Immutable once stored. Callers only ever receive copies of stored rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    /// Assigned by the store at insert time. Unique and never reused.
    pub id: i64,

    /// Member of the supported ticker set, e.g. `"BTC_USD"`.
    pub ticker: String,

    /// Index price. Serialised as a decimal string so no precision is lost in JSON.
    pub price: BigDecimal,

    /// Seconds since the epoch, shared by every tick of the same ingestion cycle.
    pub timestamp: i64,
}

/// A tick that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPriceTick {
    ticker:    String,
    price:     BigDecimal,
    timestamp: i64,
}

#[derive(Debug, Error, PartialEq)]
#[error("negative price {price} for {ticker}")]
pub struct NegativePrice {
    pub ticker: String,
    pub price:  BigDecimal,
}

impl NewPriceTick {
    /// Builds a tick, rejecting negative prices.
    pub fn new(
        ticker: impl Into<String>,
        price: BigDecimal,
        timestamp: i64,
    ) -> Result<Self, NegativePrice> {
        let ticker = ticker.into();
        if price < BigDecimal::zero() {
            return Err(NegativePrice { ticker, price });
        }
        Ok(Self { ticker, price, timestamp })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn price(&self) -> &BigDecimal {
        &self.price
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Attaches the store-assigned id.
    pub fn into_stored(self, id: i64) -> PriceTick {
        PriceTick {
            id,
            ticker:    self.ticker,
            price:     self.price,
            timestamp: self.timestamp,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
