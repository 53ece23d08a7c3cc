//! # store — Tick Store
//!
//! Append-only persistence for [`PriceTick`]s and the four read/write
//! operations the rest of the service is allowed to use.
//!
//! ## Ordering
//! Every sequence returned here is ascending by `(timestamp, id)`. Two ticks of
//! the same ticker with equal timestamps come back in insertion order.
//!
//! ## Implementations
//! * [`postgres::PgTickStore`]: `sqlx` pool over the `price_ticks` table
//!   (feature `postgres`).
//! * [`memory::MemoryTickStore`]: per-ticker ordered maps, used by tests and
//!   by builds without Postgres.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewPriceTick, PriceTick};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryTickStore;
#[cfg(feature = "postgres")]
pub use postgres::PgTickStore;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    /// The pool or the connection behind it is gone (timeout, I/O, closed pool).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The database refused the row (check or unique constraint).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Any other driver-level failure.
    #[error("query failed: {0}")]
    Query(String),

    /// A stored row no longer satisfies the tick invariants.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

// ─── Repository ───────────────────────────────────────────────────────────────

/// Tick persistence as seen by the ingestion cycle and the query service.
///
/// Implementations serialise physical writes themselves; callers may invoke
/// `append` concurrently without external locking.
#[async_trait]
pub trait TickStore: Send + Sync {
    /// Inserts one tick atomically and returns it with its assigned id.
    async fn append(&self, tick: NewPriceTick) -> Result<PriceTick, StoreError>;

    /// All ticks for `ticker`. Empty when there is no data.
    async fn all_by_ticker(&self, ticker: &str) -> Result<Vec<PriceTick>, StoreError>;

    /// The maximum-timestamp tick for `ticker` (highest id on ties).
    async fn latest_by_ticker(&self, ticker: &str) -> Result<Option<PriceTick>, StoreError>;

    /// Ticks with `from <= timestamp <= to`; an absent bound is open on that side.
    async fn range_by_ticker(
        &self,
        ticker: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<PriceTick>, StoreError>;
}
