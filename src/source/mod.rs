//! # source — Price Source Client
//!
//! One call per ticker, no retries. Every failure comes back as a
//! [`FetchError`] value for the caller to log and skip; nothing here panics or
//! aborts the ingestion cycle.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;

pub mod deribit;

pub use deribit::DeribitClient;

/// A successfully decoded index price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    /// Exchange index name the price was requested for, e.g. `"BTC_USD"`.
    pub index_name: String,
    pub price:      BigDecimal,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// Connect, DNS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The exchange answered with a non-success HTTP status.
    #[error("HTTP {status} from price source")]
    Protocol { status: u16 },

    /// The body arrived but does not carry a usable `index_price`.
    #[error("unexpected response format: {0}")]
    Format(String),
}

impl FetchError {
    /// Short label for log fields and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_)     => "transport",
            FetchError::Protocol { .. }  => "protocol",
            FetchError::Format(_)        => "format",
        }
    }
}

/// Anything that can quote a currency's index price against USD.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// `currency` is the base symbol (`"BTC"`); the source derives its own
    /// index name from it.
    async fn fetch(&self, currency: &str) -> Result<PriceObservation, FetchError>;
}
