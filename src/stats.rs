// src/stats.rs
use crate::types::RunStats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// Run counters shared by every worker. Cloning shares the same counters.
#[derive(Debug, Clone)]
pub struct StatsTracker {
    executions: Arc<AtomicU64>,
    positive_results: Arc<AtomicU64>,
    started: Instant,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            executions: Arc::new(AtomicU64::new(0)),
            positive_results: Arc::new(AtomicU64::new(0)),
            started: Instant::now(),
        }
    }

    /// One probe attempted, whatever its outcome.
    pub fn record_execution(&self) {
        self.executions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_result(&self) {
        self.positive_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RunStats {
        let elapsed = self.started.elapsed();
        let executions = self.executions.load(Ordering::Relaxed);

        RunStats {
            executions,
            positive_results: self.positive_results.load(Ordering::Relaxed),
            elapsed,
            throughput: throughput(executions, elapsed),
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

pub fn throughput(executions: u64, elapsed: Duration) -> f64 {
    if elapsed < MIN_ELAPSED {
        return 0.0;
    }
    executions as f64 / elapsed.as_secs_f64()
}
