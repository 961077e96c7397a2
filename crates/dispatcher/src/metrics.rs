//! Delivery metrics for observability.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for one dispatcher instance.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Current pending queue depth
    queue_depth: AtomicUsize,
    /// Total events accepted via enqueue
    enqueued_count: AtomicU64,
    /// Total successful sends
    sent_count: AtomicU64,
    /// Total transient failures that led to a front requeue
    retried_count: AtomicU64,
    /// Total events dropped on content failures
    dropped_count: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_depth(&self) -> usize {
        self.queue_depth.load(Ordering::Relaxed)
    }

    pub fn set_queue_depth(&self, depth: usize) {
        self.queue_depth.store(depth, Ordering::Relaxed);
    }

    pub fn enqueued_count(&self) -> u64 {
        self.enqueued_count.load(Ordering::Relaxed)
    }

    pub fn inc_enqueued(&self) {
        self.enqueued_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::Relaxed)
    }

    pub fn inc_sent(&self) {
        self.sent_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn retried_count(&self) -> u64 {
        self.retried_count.load(Ordering::Relaxed)
    }

    pub fn inc_retried(&self) {
        self.retried_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn inc_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_depth: self.queue_depth(),
            enqueued_count: self.enqueued_count(),
            sent_count: self.sent_count(),
            retried_count: self.retried_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting).
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub queue_depth: usize,
    pub enqueued_count: u64,
    pub sent_count: u64,
    pub retried_count: u64,
    pub dropped_count: u64,
}
