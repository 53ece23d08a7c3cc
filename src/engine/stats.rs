//! # engine::stats
//!
//! Process-wide ingestion counters. Written by the cycle, read by `/health`.

use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulerState {
    /// No cycle in flight.
    Idle,
    /// At least one cycle in flight.
    Running,
}

#[derive(Debug, Default)]
pub struct IngestStats {
    cycles_started:   AtomicU64,
    cycles_completed: AtomicU64,
    ticks_stored:     AtomicU64,
    fetch_failures:   AtomicU64,
    store_failures:   AtomicU64,
    /// Batch timestamp of the most recently started cycle, 0 before the first.
    last_cycle_ts:    AtomicI64,
    in_flight:        AtomicUsize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub state:            SchedulerState,
    pub in_flight:        usize,
    pub cycles_started:   u64,
    pub cycles_completed: u64,
    pub ticks_stored:     u64,
    pub fetch_failures:   u64,
    pub store_failures:   u64,
    pub last_cycle_ts:    Option<i64>,
}

/// Marks one cycle as in flight until dropped.
pub struct InFlight<'a>(&'a IngestStats);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.0.cycles_completed.fetch_add(1, Ordering::Relaxed);
    }
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycle_started(&self, timestamp: i64) -> InFlight<'_> {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        self.cycles_started.fetch_add(1, Ordering::Relaxed);
        self.last_cycle_ts.fetch_max(timestamp, Ordering::Relaxed);
        InFlight(self)
    }

    pub fn tick_stored(&self) {
        self.ticks_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn store_failed(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SchedulerState {
        if self.in_flight() > 0 {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let last = self.last_cycle_ts.load(Ordering::Relaxed);
        StatsSnapshot {
            state:            self.state(),
            in_flight:        self.in_flight(),
            cycles_started:   self.cycles_started.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            ticks_stored:     self.ticks_stored.load(Ordering::Relaxed),
            fetch_failures:   self.fetch_failures.load(Ordering::Relaxed),
            store_failures:   self.store_failures.load(Ordering::Relaxed),
            last_cycle_ts:    (last != 0).then_some(last),
        }
    }
}
