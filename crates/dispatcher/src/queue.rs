//! Pending queue - FIFO buffer with front reinsertion for retries.

use std::collections::VecDeque;
use std::sync::Mutex;

use contracts::AppointmentEvent;

/// Concurrency-safe FIFO of events awaiting dispatch.
///
/// Producers append at the back from any task; the single drain loop
/// pops from the front. A transiently failed event goes back on the
/// front so it keeps its place ahead of later arrivals. If the head
/// event keeps failing transiently it also keeps being retried first;
/// that head-of-line priority is intentional.
#[derive(Debug, Default)]
pub struct PendingQueue {
    items: Mutex<VecDeque<AppointmentEvent>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event at the back. Returns the new queue depth.
    pub fn push_back(&self, event: AppointmentEvent) -> usize {
        let mut items = self.items.lock().unwrap();
        items.push_back(event);
        items.len()
    }

    /// Reinsert an event at the front, ahead of later arrivals.
    /// Returns the new queue depth.
    pub fn push_front(&self, event: AppointmentEvent) -> usize {
        let mut items = self.items.lock().unwrap();
        items.push_front(event);
        items.len()
    }

    /// Pop the next event to deliver.
    pub fn pop_front(&self) -> Option<AppointmentEvent> {
        self.items.lock().unwrap().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
