//! Dispatcher - ordered, rate-limited delivery of events to a channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, instrument, warn};

use contracts::{AppointmentEvent, ChannelId, Messenger, SendOptions};

use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::queue::PendingQueue;

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Destination channel for every announcement.
    pub channel: ChannelId,
    /// Successful sends allowed per 60 seconds.
    pub rate_per_minute: u32,
    /// Pause after a transient delivery failure.
    pub retry_pause: Duration,
    /// Options forwarded to the messenger on every send.
    pub send_options: SendOptions,
}

impl DispatcherConfig {
    /// Minimum wall-clock gap between two successful sends.
    pub fn min_send_gap(&self) -> Duration {
        Duration::from_millis(60_000 / u64::from(self.rate_per_minute.max(1)))
    }
}

/// Handle to the outbound dispatch queue.
///
/// Cloning is cheap; every clone feeds the same queue and drain loop.
/// [`enqueue`](Self::enqueue) is the sole producer entry point: it
/// never blocks, never fails and never reports delivery outcome back.
/// Delivery status is observable through logging and
/// [`metrics`](Self::metrics).
pub struct Dispatcher<M> {
    inner: Arc<Inner<M>>,
}

impl<M> Clone for Dispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<M> {
    config: DispatcherConfig,
    client: M,
    queue: PendingQueue,
    /// True exactly while a drain loop is active.
    running: AtomicBool,
    /// Timestamp of the last completed successful send.
    last_sent_at: Mutex<Option<Instant>>,
    metrics: DispatchMetrics,
}

/// How a drain pass ended.
enum PassOutcome {
    /// Queue observed empty.
    Drained,
    /// Transient failure: head event was requeued at the front.
    PausedForRetry,
}

impl<M> Dispatcher<M>
where
    M: Messenger + Send + Sync + 'static,
{
    /// Create a dispatcher around a messenger client.
    ///
    /// The drain loop starts lazily on the first enqueue. Must be
    /// created inside a tokio runtime.
    pub fn new(config: DispatcherConfig, client: M) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                client,
                queue: PendingQueue::new(),
                running: AtomicBool::new(false),
                last_sent_at: Mutex::new(None),
                metrics: DispatchMetrics::new(),
            }),
        }
    }

    /// Accept an event for delivery.
    ///
    /// Returns as soon as the event is buffered at the back of the
    /// pending queue. Acceptance is not delivery: the drain loop sends
    /// it later, retries transient failures and drops content failures.
    pub fn enqueue(&self, event: AppointmentEvent) {
        let depth = self.inner.queue.push_back(event);
        self.inner.metrics.inc_enqueued();
        self.inner.metrics.set_queue_depth(depth);
        debug!(depth, "event accepted for delivery");

        try_start_drain(&self.inner);
    }

    /// Number of events awaiting delivery.
    pub fn pending_len(&self) -> usize {
        self.inner.queue.len()
    }

    /// True while a drain loop is active.
    pub fn is_draining(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Point-in-time delivery counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }
}

/// Spawn a drain loop unless one is already active.
///
/// The check-and-set on the running flag guarantees at most one live
/// consumer regardless of how many producers race through enqueue.
fn try_start_drain<M>(inner: &Arc<Inner<M>>)
where
    M: Messenger + Send + Sync + 'static,
{
    if inner
        .running
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
    {
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            drain_loop(inner).await;
        });
    }
}

/// Single-consumer drain loop.
///
/// Cooperative: yields only at the rate-limit wait and the
/// post-failure pause, and otherwise runs each popped event to
/// completion.
#[instrument(name = "drain_loop", skip(inner), fields(channel = %inner.config.channel))]
async fn drain_loop<M>(inner: Arc<Inner<M>>)
where
    M: Messenger + Send + Sync + 'static,
{
    loop {
        let outcome = drain_pass(&inner).await;
        inner.running.store(false, Ordering::Release);

        if let PassOutcome::PausedForRetry = outcome {
            sleep(inner.config.retry_pause).await;
        }

        // An enqueue racing the final pop, or the requeued head event,
        // may have left items behind after the flag was cleared. Keep
        // draining unless another loop already claimed the flag.
        if inner.queue.is_empty() {
            return;
        }
        if inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
    }
}

/// One pass over the queue: deliver until empty or a transient failure.
async fn drain_pass<M>(inner: &Inner<M>) -> PassOutcome
where
    M: Messenger + Send + Sync,
{
    loop {
        let Some(event) = inner.queue.pop_front() else {
            return PassOutcome::Drained;
        };
        inner.metrics.set_queue_depth(inner.queue.len());

        wait_for_send_slot(inner).await;

        let text = formatter::render(&event);
        match inner
            .client
            .send_message(&inner.config.channel, &text, &inner.config.send_options)
            .await
        {
            Ok(()) => {
                *inner.last_sent_at.lock().unwrap() = Some(Instant::now());
                inner.metrics.inc_sent();
                info!(event_id = %event.id, status = %event.status, "event delivered");
            }
            Err(err) if err.is_retriable() => {
                let event_id = event.id.clone();
                let depth = inner.queue.push_front(event);
                inner.metrics.inc_retried();
                inner.metrics.set_queue_depth(depth);
                warn!(
                    event_id = %event_id,
                    error = %err,
                    pause_ms = inner.config.retry_pause.as_millis() as u64,
                    "transient delivery failure, event requeued at front"
                );
                return PassOutcome::PausedForRetry;
            }
            Err(err) => {
                // Retrying an unmodified rejected payload cannot succeed.
                inner.metrics.inc_dropped();
                error!(
                    event_id = %event.id,
                    error = %err,
                    "event dropped: endpoint rejected content"
                );
            }
        }
    }
}

/// Rate limiter: wait out the minimum gap since the last successful
/// send. The first send is never delayed.
async fn wait_for_send_slot<M>(inner: &Inner<M>) {
    let gap = inner.config.min_send_gap();
    let last_sent_at = *inner.last_sent_at.lock().unwrap();
    if let Some(at) = last_sent_at {
        let elapsed = at.elapsed();
        if elapsed < gap {
            sleep(gap - elapsed).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::{SendError, SlotStatus};
    use messenger::MockMessenger;
    use std::time::Instant as StdInstant;

    fn test_config(rate_per_minute: u32, retry_pause: Duration) -> DispatcherConfig {
        DispatcherConfig {
            channel: ChannelId::new("@test_channel"),
            rate_per_minute,
            retry_pause,
            send_options: SendOptions::default(),
        }
    }

    fn event(id: &str) -> AppointmentEvent {
        AppointmentEvent {
            id: id.to_string(),
            status: SlotStatus::Open,
            center_name: Some(id.to_string()),
            country_code: None,
            mission_code: None,
            category: None,
            visa_type: None,
            last_available_date: None,
            check_count: 1,
            last_checked_at: Utc::now(),
        }
    }

    async fn wait_until_idle(dispatcher: &Dispatcher<Arc<MockMessenger>>) {
        for _ in 0..400 {
            if dispatcher.pending_len() == 0 && !dispatcher.is_draining() {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("dispatcher did not drain in time");
    }

    #[tokio::test]
    async fn test_events_delivered_in_enqueue_order() {
        let mock = Arc::new(MockMessenger::new());
        let dispatcher = Dispatcher::new(
            test_config(6_000, Duration::from_millis(50)),
            Arc::clone(&mock),
        );

        for id in ["e1", "e2", "e3", "e4", "e5"] {
            dispatcher.enqueue(event(id));
        }
        wait_until_idle(&dispatcher).await;

        let delivered = mock.delivered();
        assert_eq!(delivered.len(), 5);
        for (message, id) in delivered.iter().zip(["e1", "e2", "e3", "e4", "e5"]) {
            assert!(message.text.contains(id), "expected {id} in {}", message.text);
        }
        assert_eq!(dispatcher.metrics().sent_count, 5);
    }

    #[tokio::test]
    async fn test_transient_failure_retries_after_pause() {
        let mock = Arc::new(MockMessenger::new());
        mock.push_outcome(Err(SendError::transient("connection reset")));

        let retry_pause = Duration::from_millis(200);
        let dispatcher = Dispatcher::new(test_config(6_000, retry_pause), Arc::clone(&mock));

        let started = StdInstant::now();
        dispatcher.enqueue(event("e1"));
        wait_until_idle(&dispatcher).await;

        assert_eq!(mock.attempt_count(), 2);
        assert_eq!(mock.delivered().len(), 1);
        assert!(
            started.elapsed() >= retry_pause,
            "retry happened before the pause elapsed"
        );
        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.retried_count, 1);
        assert_eq!(snapshot.sent_count, 1);
    }

    #[tokio::test]
    async fn test_content_failure_drops_without_pause() {
        let mock = Arc::new(MockMessenger::new());
        mock.push_outcome(Err(SendError::content("can't parse entities")));

        // Pause long enough that accidentally applying it would trip the
        // elapsed-time assertion below.
        let dispatcher = Dispatcher::new(
            test_config(6_000, Duration::from_secs(5)),
            Arc::clone(&mock),
        );

        let started = StdInstant::now();
        dispatcher.enqueue(event("bad"));
        dispatcher.enqueue(event("good"));
        wait_until_idle(&dispatcher).await;

        assert_eq!(mock.attempt_count(), 2);
        let delivered = mock.delivered();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].text.contains("good"));
        assert!(started.elapsed() < Duration::from_secs(2));

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.dropped_count, 1);
        assert_eq!(snapshot.retried_count, 0);
    }

    #[tokio::test]
    async fn test_requeued_event_precedes_earlier_arrivals() {
        let mock = Arc::new(MockMessenger::new());
        mock.push_outcome(Err(SendError::transient("timeout")));

        let dispatcher = Dispatcher::new(
            test_config(6_000, Duration::from_millis(100)),
            Arc::clone(&mock),
        );

        dispatcher.enqueue(event("e"));
        dispatcher.enqueue(event("f"));
        dispatcher.enqueue(event("g"));
        wait_until_idle(&dispatcher).await;

        assert_eq!(mock.attempt_count(), 4);
        let delivered = mock.delivered();
        assert_eq!(delivered.len(), 3);
        assert!(delivered[0].text.contains("e"));
        assert!(delivered[1].text.contains("f"));
        assert!(delivered[2].text.contains("g"));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_successful_sends() {
        let mock = Arc::new(MockMessenger::new());
        // 600/min = one send per 100ms.
        let dispatcher = Dispatcher::new(
            test_config(600, Duration::from_millis(50)),
            Arc::clone(&mock),
        );

        for id in ["e1", "e2", "e3"] {
            dispatcher.enqueue(event(id));
        }
        wait_until_idle(&dispatcher).await;

        let delivered = mock.delivered();
        assert_eq!(delivered.len(), 3);
        for pair in delivered.windows(2) {
            let gap = pair[1].at.duration_since(pair[0].at);
            assert!(
                gap >= Duration::from_millis(90),
                "sends only {}ms apart",
                gap.as_millis()
            );
        }
    }

    #[tokio::test]
    async fn test_enqueue_while_draining_appends_to_back() {
        let mock = Arc::new(MockMessenger::new());
        // Slow rate so the loop is mid-wait when the second batch lands.
        let dispatcher = Dispatcher::new(
            test_config(600, Duration::from_millis(50)),
            Arc::clone(&mock),
        );

        dispatcher.enqueue(event("e1"));
        dispatcher.enqueue(event("e2"));
        sleep(Duration::from_millis(30)).await;
        dispatcher.enqueue(event("e3"));
        wait_until_idle(&dispatcher).await;

        let delivered = mock.delivered();
        assert_eq!(delivered.len(), 3);
        assert!(delivered[0].text.contains("e1"));
        assert!(delivered[1].text.contains("e2"));
        assert!(delivered[2].text.contains("e3"));
        assert_eq!(dispatcher.metrics().enqueued_count, 3);
    }
}
