//! # source::deribit
//!
//! Deribit `public/get_index_price` over plain HTTP GET.
//!
//! ```text
//! GET {base}/public/get_index_price?index_name=BTC_USD
//!
//! 200 {"jsonrpc":"2.0","result":{"index_price":64123.12,"estimated_delivery_price":64123.12}}
//! ```
//!
//! The client owns one `reqwest::Client` (connection pool included). It is
//! built once in [`DeribitClient::new`] and its connections are released when
//! the `DeribitClient` is dropped.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::debug;

use super::{FetchError, PriceObservation, PriceSource};
use crate::models::ticker::ticker_for;

// ─── Wire Format ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<IndexPriceResult>,
    #[serde(default)]
    error:  Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct IndexPriceResult {
    /// Kept as the raw JSON literal so no `f64` ever sees the price.
    #[serde(default)]
    index_price: Option<Box<RawValue>>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code:    i64,
    message: String,
}

// ─── Client ───────────────────────────────────────────────────────────────────

pub struct DeribitClient {
    http:     reqwest::Client,
    base_url: String,
}

impl DeribitClient {
    /// `timeout` bounds the whole request, connect through body.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("index-sampler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PriceSource for DeribitClient {
    async fn fetch(&self, currency: &str) -> Result<PriceObservation, FetchError> {
        let index_name = ticker_for(currency);
        let url = format!("{}/public/get_index_price", self.base_url);

        debug!(%index_name, "Requesting index price");

        let resp = self
            .http
            .get(&url)
            .query(&[("index_name", index_name.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Protocol { status: status.as_u16() });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let price = parse_index_price(&body)?;
        Ok(PriceObservation { index_name, price })
    }
}

/// Pulls `result.index_price` out of a JSON-RPC body as an exact decimal.
fn parse_index_price(body: &str) -> Result<BigDecimal, FetchError> {
    let envelope: RpcEnvelope = serde_json::from_str(body)
        .map_err(|e| FetchError::Format(format!("invalid JSON: {e}")))?;

    if let Some(err) = envelope.error {
        return Err(FetchError::Format(format!(
            "exchange error {}: {}",
            err.code, err.message
        )));
    }

    let raw = envelope
        .result
        .and_then(|r| r.index_price)
        .ok_or_else(|| FetchError::Format("missing result.index_price".into()))?;

    // a JSON number literal starts with '-' or a digit; strings, null,
    // objects and booleans do not
    let literal = raw.get().trim();
    if !literal.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
        return Err(FetchError::Format(format!(
            "index_price is not a number: {literal}"
        )));
    }

    let price = BigDecimal::from_str(literal)
        .map_err(|e| FetchError::Format(format!("index_price {literal}: {e}")))?;

    if price < BigDecimal::zero() {
        return Err(FetchError::Format(format!("negative index_price {price}")));
    }
    Ok(price)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
