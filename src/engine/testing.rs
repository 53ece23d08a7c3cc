//! Stub sources and stores shared by the engine, query and route tests.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use tokio::sync::Semaphore;

use crate::models::{NewPriceTick, PriceTick};
use crate::source::{FetchError, PriceObservation, PriceSource};
use crate::store::{MemoryTickStore, StoreError, TickStore};

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

/// Canned answer per currency. Unknown currencies fail with a transport error.
#[derive(Default)]
pub struct StubSource {
    answers: HashMap<String, Result<BigDecimal, FetchError>>,
    calls:   AtomicUsize,
    gate:    Option<Arc<Semaphore>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price(mut self, currency: &str, price: &str) -> Self {
        self.answers.insert(currency.to_string(), Ok(dec(price)));
        self
    }

    pub fn failing(mut self, currency: &str, err: FetchError) -> Self {
        self.answers.insert(currency.to_string(), Err(err));
        self
    }

    /// Every fetch waits for one permit from `gate` before answering.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for StubSource {
    async fn fetch(&self, currency: &str) -> Result<PriceObservation, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        match self.answers.get(currency) {
            Some(Ok(price)) => Ok(PriceObservation {
                index_name: format!("{currency}_USD"),
                price:      price.clone(),
            }),
            Some(Err(e)) => Err(e.clone()),
            None => Err(FetchError::Transport(format!("no route to {currency}"))),
        }
    }
}

/// Memory store that refuses appends for selected tickers and counts reads.
#[derive(Default)]
pub struct FlakyStore {
    inner:        MemoryTickStore,
    reject:       Vec<String>,
    unavailable:  bool,
    reads:        AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, ticker: &str) -> Self {
        self.reject.push(ticker.to_string());
        self
    }

    /// Every operation fails as if the database were down.
    pub fn down() -> Self {
        Self { unavailable: true, ..Self::default() }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TickStore for FlakyStore {
    async fn append(&self, tick: NewPriceTick) -> Result<PriceTick, StoreError> {
        self.check()?;
        if self.reject.iter().any(|t| t == tick.ticker()) {
            return Err(StoreError::Constraint(format!("rejected {}", tick.ticker())));
        }
        self.inner.append(tick).await
    }

    async fn all_by_ticker(&self, ticker: &str) -> Result<Vec<PriceTick>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.all_by_ticker(ticker).await
    }

    async fn latest_by_ticker(&self, ticker: &str) -> Result<Option<PriceTick>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.latest_by_ticker(ticker).await
    }

    async fn range_by_ticker(
        &self,
        ticker: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<PriceTick>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.range_by_ticker(ticker, from, to).await
    }
}
