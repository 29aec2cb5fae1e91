//! Handler metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single handler registration
#[derive(Debug, Default)]
pub struct HandlerMetrics {
    /// Times the interest mask matched a raised kind
    invocation_count: AtomicU64,
    /// Invocations that wrote or logged something
    acted_count: AtomicU64,
    /// Invocations that decided there was nothing to do
    skipped_count: AtomicU64,
    /// Invocations that stopped after a logged failure
    aborted_count: AtomicU64,
}

impl HandlerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocation_count(&self) -> u64 {
        self.invocation_count.load(Ordering::Relaxed)
    }

    pub fn inc_invocation_count(&self) {
        self.invocation_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn acted_count(&self) -> u64 {
        self.acted_count.load(Ordering::Relaxed)
    }

    pub fn inc_acted_count(&self) {
        self.acted_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped_count(&self) -> u64 {
        self.skipped_count.load(Ordering::Relaxed)
    }

    pub fn inc_skipped_count(&self) {
        self.skipped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn aborted_count(&self) -> u64 {
        self.aborted_count.load(Ordering::Relaxed)
    }

    pub fn inc_aborted_count(&self) {
        self.aborted_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            invocation_count: self.invocation_count(),
            acted_count: self.acted_count(),
            skipped_count: self.skipped_count(),
            aborted_count: self.aborted_count(),
        }
    }
}

/// Snapshot of handler metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub invocation_count: u64,
    pub acted_count: u64,
    pub skipped_count: u64,
    pub aborted_count: u64,
}
