//! # engine::scheduler
//!
//! Fires the [`IngestionCycle`] every time its [`Trigger`] does, until shutdown.
//!
//! ## Overlap
//! Cycles are **not** mutually exclusive. Each firing is spawned as its own
//! task, so a cycle that outlives the period runs alongside the next one.
//! Ticks are immutable and stamped at cycle start, which keeps overlapping
//! cycles from touching each other's rows; they only produce closely spaced
//! timestamps.
//!
//! ## Missed periods
//! [`IntervalTrigger`] uses `MissedTickBehavior::Skip`: periods missed while
//! the runtime was stalled are dropped, never replayed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::engine::cycle::IngestionCycle;
use crate::engine::stats::SchedulerState;

// ─── Triggers ─────────────────────────────────────────────────────────────────

/// Source of firing events for the scheduler.
#[async_trait]
pub trait Trigger: Send {
    /// Resolves at the next firing. `None` means no more firings will come.
    /// Must be cancel safe.
    async fn next(&mut self) -> Option<()>;
}

/// Fixed-period wall-clock trigger. The first firing is immediate.
pub struct IntervalTrigger {
    interval: Interval,
}

impl IntervalTrigger {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl Trigger for IntervalTrigger {
    async fn next(&mut self) -> Option<()> {
        self.interval.tick().await;
        Some(())
    }
}

// ─── Scheduler ────────────────────────────────────────────────────────────────

pub struct Scheduler {
    cycle: Arc<IngestionCycle>,
}

impl Scheduler {
    pub fn new(cycle: Arc<IngestionCycle>) -> Self {
        Self { cycle }
    }

    pub fn state(&self) -> SchedulerState {
        self.cycle.stats().state()
    }

    /// Fires cycles until `shutdown` flips to `true` (or its sender is dropped)
    /// or the trigger is exhausted, then waits for in-flight cycles to finish.
    pub async fn run<T: Trigger>(self, mut trigger: T, mut shutdown: watch::Receiver<bool>) {
        let mut in_flight = JoinSet::new();

        info!("⏱️  Scheduler started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                // Err means the sender is gone, which counts as shutdown too
                _ = shutdown.changed() => break,

                fired = trigger.next() => {
                    if fired.is_none() {
                        info!("Trigger exhausted");
                        break;
                    }

                    while let Some(done) = in_flight.try_join_next() {
                        if let Err(e) = done {
                            error!(error = %e, "Ingestion cycle task failed");
                        }
                    }

                    if self.state() == SchedulerState::Running {
                        warn!(
                            in_flight = self.cycle.stats().in_flight(),
                            "Previous cycle still running, starting another anyway"
                        );
                    }

                    let cycle = Arc::clone(&self.cycle);
                    in_flight.spawn(async move {
                        cycle.run().await;
                    });
                }
            }
        }

        info!(in_flight = in_flight.len(), "Scheduler stopping, waiting for in-flight cycles");
        while let Some(done) = in_flight.join_next().await {
            if let Err(e) = done {
                error!(error = %e, "Ingestion cycle task failed");
            }
        }
        info!("Scheduler stopped");
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
