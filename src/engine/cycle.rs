//! # engine::cycle
//!
//! **Ingestion Cycle**: one sampling round across every supported ticker.
//!
//! ```text
//! t = now()                                   (one timestamp per batch)
//!   ├─ BTC ── fetch ──▶ append(BTC_USD, p, t)
//!   ├─ ETH ── fetch ──▶ append(ETH_USD, p, t)
//!   └─ ...    (all tickers concurrently)
//! ```
//!
//! Each ticker runs its own fetch-then-append pipeline. A failure in one
//! pipeline is logged, recorded in the [`CycleReport`], and has no effect on
//! the others; a failed fetch never produces a placeholder tick.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use crate::engine::stats::IngestStats;
use crate::models::{ticker::currency_of, NewPriceTick, PriceTick, TickerSet};
use crate::source::{FetchError, PriceSource};
use crate::store::{StoreError, TickStore};

// ─── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum TickerOutcome {
    Stored(PriceTick),
    FetchFailed(FetchError),
    StoreFailed(StoreError),
}

#[derive(Debug)]
pub struct TickerReport {
    pub ticker:  String,
    pub outcome: TickerOutcome,
}

#[derive(Debug)]
pub struct CycleReport {
    /// Shared by every tick this cycle stored.
    pub timestamp: i64,
    /// One entry per supported ticker, in configuration order.
    pub tickers:   Vec<TickerReport>,
}

impl CycleReport {
    pub fn stored(&self) -> impl Iterator<Item = &PriceTick> {
        self.tickers.iter().filter_map(|r| match &r.outcome {
            TickerOutcome::Stored(tick) => Some(tick),
            _ => None,
        })
    }

    pub fn stored_count(&self) -> usize {
        self.stored().count()
    }

    pub fn failed_count(&self) -> usize {
        self.tickers.len() - self.stored_count()
    }

    /// Something was attempted and nothing was stored.
    pub fn is_total_failure(&self) -> bool {
        !self.tickers.is_empty() && self.stored_count() == 0
    }

    #[cfg(test)]
    pub fn outcome(&self, ticker: &str) -> Option<&TickerOutcome> {
        self.tickers
            .iter()
            .find(|r| r.ticker == ticker)
            .map(|r| &r.outcome)
    }
}

// ─── Cycle ────────────────────────────────────────────────────────────────────

pub struct IngestionCycle {
    source:  Arc<dyn PriceSource>,
    store:   Arc<dyn TickStore>,
    tickers: TickerSet,
    stats:   Arc<IngestStats>,
}

impl IngestionCycle {
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: Arc<dyn TickStore>,
        tickers: TickerSet,
        stats: Arc<IngestStats>,
    ) -> Self {
        Self { source, store, tickers, stats }
    }

    pub fn stats(&self) -> &Arc<IngestStats> {
        &self.stats
    }

    /// Runs one batch stamped with the current UTC second.
    pub async fn run(&self) -> CycleReport {
        self.run_at(chrono::Utc::now().timestamp()).await
    }

    /// Runs one batch stamped with `timestamp`.
    pub async fn run_at(&self, timestamp: i64) -> CycleReport {
        let _in_flight = self.stats.cycle_started(timestamp);

        debug!(timestamp, tickers = %self.tickers, "Ingestion cycle starting");

        let pipelines = self
            .tickers
            .iter()
            .map(|ticker| self.ingest_ticker(ticker, timestamp));
        let tickers = join_all(pipelines).await;

        let report = CycleReport { timestamp, tickers };

        if report.is_total_failure() {
            error!(
                timestamp,
                attempted = report.tickers.len(),
                "❌ Ingestion cycle stored nothing"
            );
        } else {
            info!(
                timestamp,
                stored = report.stored_count(),
                failed = report.failed_count(),
                "Ingestion cycle complete"
            );
        }

        report
    }

    async fn ingest_ticker(&self, ticker: &str, timestamp: i64) -> TickerReport {
        let outcome = match self.fetch_tick(ticker, timestamp).await {
            Err(e) => {
                self.stats.fetch_failed();
                warn!(ticker, kind = e.kind(), error = %e, "Fetch failed, ticker skipped this cycle");
                TickerOutcome::FetchFailed(e)
            }
            Ok(tick) => match self.store.append(tick).await {
                Ok(stored) => {
                    self.stats.tick_stored();
                    debug!(
                        ticker,
                        id    = stored.id,
                        price = %stored.price,
                        timestamp,
                        "Tick stored"
                    );
                    TickerOutcome::Stored(stored)
                }
                Err(e) => {
                    self.stats.store_failed();
                    error!(ticker, error = %e, "Failed to store tick");
                    TickerOutcome::StoreFailed(e)
                }
            },
        };

        TickerReport { ticker: ticker.to_string(), outcome }
    }

    async fn fetch_tick(&self, ticker: &str, timestamp: i64) -> Result<NewPriceTick, FetchError> {
        let currency = currency_of(ticker)
            .ok_or_else(|| FetchError::Format(format!("cannot derive currency from {ticker}")))?;

        let observation = self.source.fetch(currency).await?;
        debug!(ticker, index = %observation.index_name, price = %observation.price, "Index price received");

        NewPriceTick::new(ticker, observation.price, timestamp)
            .map_err(|e| FetchError::Format(e.to_string()))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
