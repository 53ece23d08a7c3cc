//! Ingestion engine: the per-batch cycle, the scheduler that fires it, and
//! the counters both of them feed.

pub mod cycle;
pub mod scheduler;
pub mod stats;
#[cfg(test)]
pub mod testing;

pub use cycle::IngestionCycle;
pub use scheduler::{IntervalTrigger, Scheduler};
pub use stats::IngestStats;
