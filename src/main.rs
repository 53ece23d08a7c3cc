//! # Index Sampler — Deribit Index Price Time Series
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────┐  every FETCH_INTERVAL_SECS   ┌────────────────────────┐
//!  │  Scheduler   │ ───────────────────────────▶ │  Ingestion Cycle       │
//!  └──────────────┘                              │  t = now()             │
//!                                                │  ├─ fetch BTC ─┐       │   GET /public/get_index_price
//!                                                │  └─ fetch ETH ─┼──────▶│──────────────▶ Deribit
//!                                                └────────────────┼───────┘
//!                                                                 ▼ append(ticker, price, t)
//!  ┌──────────────┐   GET /api/v1/prices/*       ┌────────────────────────┐
//!  │   Clients    │ ───────────────────────────▶ │  Tick Store (Postgres) │
//!  └──────────────┘   (Query Service)            │  price_ticks           │
//!                                                └────────────────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable              | Default                          | Description                    |
//! |-----------------------|----------------------------------|--------------------------------|
//! | `BIND_ADDR`           | `0.0.0.0:8000`                   | Address Axum listens on        |
//! | `SUPPORTED_TICKERS`   | `BTC_USD,ETH_USD`                | Tickers sampled and queryable  |
//! | `FETCH_INTERVAL_SECS` | `60`                             | Sampling period                |
//! | `FETCH_TIMEOUT_SECS`  | `10`                             | Per-request source timeout     |
//! | `DERIBIT_API_URL`     | `https://www.deribit.com/api/v2` | Price source base URL          |
//! | `DATABASE_URL`        | built from `DB_*`                | PostgreSQL connection string   |
//! | `RUST_LOG`            | `index_sampler=debug`            | Tracing filter                 |

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod models;
mod query;
mod routes;
mod source;
mod state;
mod store;

use config::Config;
use engine::{IngestStats, IngestionCycle, IntervalTrigger, Scheduler};
use query::PriceQueryService;
use source::DeribitClient;
use state::build_state;
use store::TickStore;

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional, CI/prod can use real env vars) ───────────────
    dotenvy::dotenv().ok();

    // ── 2. Initialise structured logging ─────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("index_sampler=debug".parse()?)
            .add_directive("tower_http=info".parse()?))
        .init();

    info!(
        r#"

  ╔═══════════════════════════════════════════════╗
  ║      INDEX SAMPLER — Deribit Price Series     ║
  ║      Rust + Axum  ·  Ingest & Query           ║
  ╚═══════════════════════════════════════════════╝"#
    );

    let config = Config::from_env().context("Failed to load config")?;

    info!(
        tickers  = %config.tickers,
        interval = ?config.fetch_interval,
        source   = %config.deribit_api_url,
        "Configuration loaded"
    );

    // ── 3. Tick store ────────────────────────────────────────────────────────
    #[cfg(feature = "postgres")]
    let pg = Arc::new(store::PgTickStore::connect(&config.db).await?);
    #[cfg(feature = "postgres")]
    let tick_store: Arc<dyn TickStore> = pg.clone();

    #[cfg(not(feature = "postgres"))]
    let tick_store: Arc<dyn TickStore> = {
        tracing::warn!("Built without `postgres`, ticks are kept in memory only");
        Arc::new(store::MemoryTickStore::new())
    };

    // ── 4. Ingestion: client → cycle → scheduler ─────────────────────────────
    let client = DeribitClient::new(&config.deribit_api_url, config.fetch_timeout)
        .context("Failed to build HTTP client")?;

    let stats = Arc::new(IngestStats::new());
    let cycle = IngestionCycle::new(
        Arc::new(client),
        Arc::clone(&tick_store),
        config.tickers.clone(),
        Arc::clone(&stats),
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = tokio::spawn(
        Scheduler::new(Arc::new(cycle))
            .run(IntervalTrigger::new(config.fetch_interval), stop_rx),
    );

    // ── 5. HTTP ──────────────────────────────────────────────────────────────
    let prices = PriceQueryService::new(tick_store, config.tickers.clone());
    let app = routes::router(build_state(prices, stats, config.fetch_interval));

    info!(addr = ?config.bind_addr, "🚀 Index Sampler server starting");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // ── 6. Drain: scheduler first (it owns the client), then the pool ────────
    info!("Shutting down");
    let _ = stop_tx.send(true);
    scheduler.await.context("Scheduler task panicked")?;

    #[cfg(feature = "postgres")]
    pg.close().await;

    info!("Bye");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
