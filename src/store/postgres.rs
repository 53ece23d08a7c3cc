//! # store::postgres — PostgreSQL Tick Store
//!
//! `sqlx` pool over the `price_ticks` table.
//!
//! ## Setup
//! 1. Create the database named in `DB_NAME` (default `deribit_db`).
//! 2. Set `DATABASE_URL`, or the `DB_*` parts, in `.env`.
//! 3. The embedded migration runs on [`PgTickStore::connect`]; it is idempotent.
//!
//! Each operation checks a connection out of the pool for exactly one
//! statement, so the pool is shared safely between the ingestion cycle and
//! HTTP readers and every connection goes back on every exit path.

use anyhow::Context;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::{error::ErrorKind, postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::{StoreError, TickStore};
use crate::config::DbConfig;
use crate::models::{NewPriceTick, PriceTick};

// ─── Pool Init ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PgTickStore {
    pool: PgPool,
}

impl PgTickStore {
    /// Opens the bounded pool and applies migrations.
    pub async fn connect(config: &DbConfig) -> anyhow::Result<Self> {
        info!(
            max_connections = config.max_connections,
            acquire_timeout = ?config.acquire_timeout,
            "Connecting to PostgreSQL..."
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .test_before_acquire(true)
            .connect(&config.url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        run_migrations(&pool).await?;

        info!("✅ PostgreSQL connected and migrations applied");
        Ok(Self { pool })
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool drained");
    }
}

async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::raw_sql(include_str!("../../migrations/001_price_ticks.sql"))
        .execute(pool)
        .await
        .context("Failed to run migration 001_price_ticks.sql")?;

    Ok(())
}

// ─── Rows ─────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct TickRow {
    id:        i64,
    ticker:    String,
    price:     BigDecimal,
    timestamp: i64,
}

impl From<TickRow> for PriceTick {
    fn from(row: TickRow) -> Self {
        PriceTick {
            id:        row.id,
            ticker:    row.ticker,
            price:     row.price,
            timestamp: row.timestamp,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            sqlx::Error::Database(db) if db.kind() != ErrorKind::Other => {
                StoreError::Constraint(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Corrupt(err.to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

// ─── Repository ───────────────────────────────────────────────────────────────

#[async_trait]
impl TickStore for PgTickStore {
    async fn append(&self, tick: NewPriceTick) -> Result<PriceTick, StoreError> {
        let row = sqlx::query_as::<_, TickRow>(
            r#"
            INSERT INTO price_ticks (ticker, price, timestamp)
            VALUES ($1, $2, $3)
            RETURNING id, ticker, price, timestamp
            "#,
        )
        .bind(tick.ticker())
        .bind(tick.price())
        .bind(tick.timestamp())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn all_by_ticker(&self, ticker: &str) -> Result<Vec<PriceTick>, StoreError> {
        let rows = sqlx::query_as::<_, TickRow>(
            r#"
            SELECT id, ticker, price, timestamp
            FROM price_ticks
            WHERE ticker = $1
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(ticker)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PriceTick::from).collect())
    }

    async fn latest_by_ticker(&self, ticker: &str) -> Result<Option<PriceTick>, StoreError> {
        let row = sqlx::query_as::<_, TickRow>(
            r#"
            SELECT id, ticker, price, timestamp
            FROM price_ticks
            WHERE ticker = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(ticker)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PriceTick::from))
    }

    async fn range_by_ticker(
        &self,
        ticker: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<PriceTick>, StoreError> {
        let rows = sqlx::query_as::<_, TickRow>(
            r#"
            SELECT id, ticker, price, timestamp
            FROM price_ticks
            WHERE ticker = $1
              AND ($2::BIGINT IS NULL OR timestamp >= $2)
              AND ($3::BIGINT IS NULL OR timestamp <= $3)
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(ticker)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PriceTick::from).collect())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
