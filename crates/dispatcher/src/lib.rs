//! # Dispatcher
//!
//! The outbound dispatch queue for channel announcements.
//!
//! Responsibilities:
//! - Accept events from producers (`enqueue`, fire-and-forget)
//! - Drain them in FIFO order through a single consumer loop
//! - Enforce the minimum gap between successful sends
//! - Retry transient failures at the queue front, drop content failures

pub mod dispatcher;
pub mod metrics;
pub mod queue;

pub use contracts::{AppointmentEvent, Messenger, SendError};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use queue::PendingQueue;
