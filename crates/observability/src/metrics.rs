//! Dispatch metric recording via the `metrics` facade.
//!
//! The dispatcher keeps its own atomic counters; the run pipeline
//! periodically mirrors a snapshot of them into the installed recorder
//! so Prometheus sees absolute values.

use metrics::{counter, gauge};

/// Record one dispatcher snapshot.
///
/// Counter values are absolute (monotonic within one process), the
/// queue depth is a gauge.
pub fn record_dispatch_counters(
    queue_depth: usize,
    enqueued: u64,
    sent: u64,
    retried: u64,
    dropped: u64,
) {
    gauge!("slot_herald_queue_depth").set(queue_depth as f64);
    counter!("slot_herald_events_enqueued_total").absolute(enqueued);
    counter!("slot_herald_events_sent_total").absolute(sent);
    counter!("slot_herald_events_retried_total").absolute(retried);
    counter!("slot_herald_events_dropped_total").absolute(dropped);
}
