//! # Integration Tests
//!
//! End-to-end tests over the dispatch queue: ordering, rate spacing,
//! retry and drop policy, exercised against the mock messenger.

#[cfg(test)]
mod support {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use contracts::{AppointmentEvent, ChannelId, SendOptions, SlotStatus};
    use dispatcher::{Dispatcher, DispatcherConfig};
    use messenger::MockMessenger;

    pub fn dispatcher_with(
        rate_per_minute: u32,
        retry_pause: Duration,
    ) -> (Arc<MockMessenger>, Dispatcher<Arc<MockMessenger>>) {
        let mock = Arc::new(MockMessenger::new());
        let dispatcher = Dispatcher::new(
            DispatcherConfig {
                channel: ChannelId::new("@integration"),
                rate_per_minute,
                retry_pause,
                send_options: SendOptions::default(),
            },
            Arc::clone(&mock),
        );
        (mock, dispatcher)
    }

    pub fn event(id: &str) -> AppointmentEvent {
        AppointmentEvent {
            id: id.to_string(),
            status: SlotStatus::Open,
            center_name: Some(format!("center-{id}")),
            country_code: Some("IN".into()),
            mission_code: Some("de".into()),
            category: Some("Normal".into()),
            visa_type: Some("Schengen Visa".into()),
            last_available_date: Some("2026-09-14".into()),
            check_count: 1,
            last_checked_at: Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap(),
        }
    }

    pub async fn wait_until_idle(dispatcher: &Dispatcher<Arc<MockMessenger>>) {
        for _ in 0..600 {
            if dispatcher.pending_len() == 0 && !dispatcher.is_draining() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("dispatcher did not drain in time");
    }
}

#[cfg(test)]
mod ordering_tests {
    use super::support::*;
    use std::time::Duration;

    /// With no failures, delivery order equals enqueue order.
    #[tokio::test]
    async fn test_fifo_delivery_order() {
        let (mock, dispatcher) = dispatcher_with(6_000, Duration::from_millis(50));

        let ids = ["a", "b", "c", "d", "e", "f"];
        for id in ids {
            dispatcher.enqueue(event(id));
        }
        wait_until_idle(&dispatcher).await;

        let delivered = mock.delivered();
        assert_eq!(delivered.len(), ids.len());
        for (message, id) in delivered.iter().zip(ids) {
            assert!(
                message.text.contains(&format!("center-{id}")),
                "expected event {id}, got: {}",
                message.text
            );
        }
    }

    /// Producers racing the drain loop still only ever append at the
    /// back; nothing is lost or reordered.
    #[tokio::test]
    async fn test_concurrent_producers_lose_nothing() {
        let (mock, dispatcher) = dispatcher_with(6_000, Duration::from_millis(50));

        let mut handles = Vec::new();
        for batch in 0..4 {
            let dispatcher = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..5 {
                    dispatcher.enqueue(event(&format!("p{batch}-{i}")));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        wait_until_idle(&dispatcher).await;

        assert_eq!(mock.delivered().len(), 20);
        assert_eq!(dispatcher.metrics().sent_count, 20);
    }
}

#[cfg(test)]
mod rate_tests {
    use super::support::*;
    use std::time::Duration;

    /// Three events at 60/min arrive spaced at least ~1s apart, in
    /// order.
    #[tokio::test]
    async fn test_one_per_second_spacing() {
        let (mock, dispatcher) = dispatcher_with(60, Duration::from_millis(50));

        for id in ["a", "b", "c"] {
            dispatcher.enqueue(event(id));
        }
        wait_until_idle(&dispatcher).await;

        let delivered = mock.delivered();
        assert_eq!(delivered.len(), 3);
        assert!(delivered[0].text.contains("center-a"));
        assert!(delivered[2].text.contains("center-c"));

        for pair in delivered.windows(2) {
            let gap = pair[1].at.duration_since(pair[0].at);
            assert!(
                gap >= Duration::from_millis(950),
                "consecutive sends only {}ms apart",
                gap.as_millis()
            );
        }
    }

    /// The first send is not delayed by the rate limiter.
    #[tokio::test]
    async fn test_first_send_is_immediate() {
        let (mock, dispatcher) = dispatcher_with(60, Duration::from_millis(50));

        let started = std::time::Instant::now();
        dispatcher.enqueue(event("only"));
        wait_until_idle(&dispatcher).await;

        assert_eq!(mock.delivered().len(), 1);
        assert!(
            started.elapsed() < Duration::from_millis(500),
            "single send took {}ms",
            started.elapsed().as_millis()
        );
    }
}

#[cfg(test)]
mod retry_tests {
    use super::support::*;
    use contracts::SendError;
    use std::time::Duration;

    /// One transient failure, then success on the next drain pass
    /// after the pause: exactly two attempts, one delivery.
    #[tokio::test]
    async fn test_transient_failure_then_success() {
        let (mock, dispatcher) = dispatcher_with(6_000, Duration::from_millis(200));
        mock.push_outcome(Err(SendError::transient("read timed out")));

        let started = std::time::Instant::now();
        dispatcher.enqueue(event("flaky"));
        wait_until_idle(&dispatcher).await;

        assert_eq!(mock.attempt_count(), 2);
        assert_eq!(mock.delivered().len(), 1);
        assert!(started.elapsed() >= Duration::from_millis(200));

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.retried_count, 1);
        assert_eq!(snapshot.dropped_count, 0);
    }

    /// A transiently failed head event is retried before events that
    /// were already queued behind it.
    #[tokio::test]
    async fn test_failed_head_keeps_queue_position() {
        let (mock, dispatcher) = dispatcher_with(6_000, Duration::from_millis(100));
        mock.push_outcome(Err(SendError::transient("connection refused")));

        dispatcher.enqueue(event("e"));
        dispatcher.enqueue(event("f"));
        dispatcher.enqueue(event("g"));
        wait_until_idle(&dispatcher).await;

        assert_eq!(mock.attempt_count(), 4);
        let delivered = mock.delivered();
        assert_eq!(delivered.len(), 3);
        assert!(delivered[0].text.contains("center-e"));
        assert!(delivered[1].text.contains("center-f"));
        assert!(delivered[2].text.contains("center-g"));
    }

    /// A content rejection drops the event after one attempt and the
    /// loop moves on without the retry pause.
    #[tokio::test]
    async fn test_content_failure_drops_immediately() {
        let (mock, dispatcher) = dispatcher_with(6_000, Duration::from_secs(10));
        mock.push_outcome(Err(SendError::content(
            "Bad Request: can't parse entities",
        )));

        let started = std::time::Instant::now();
        dispatcher.enqueue(event("poison"));
        dispatcher.enqueue(event("fine"));
        wait_until_idle(&dispatcher).await;

        assert_eq!(mock.attempt_count(), 2);
        let delivered = mock.delivered();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].text.contains("center-fine"));
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "content drop must not trigger the retry pause"
        );

        assert_eq!(dispatcher.metrics().dropped_count, 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use super::support::*;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ChannelId, ParseMode, SendOptions};
    use dispatcher::{Dispatcher, DispatcherConfig};
    use messenger::MockMessenger;
    use std::sync::Arc;
    use std::time::Duration;

    /// Config file -> dispatcher settings -> formatted, escaped
    /// delivery.
    #[tokio::test]
    async fn test_config_to_delivery() {
        let toml = r#"
[telegram]
bot_token = "123456:abcdef"
channel = "@visa_slots"

[dispatch]
rate_per_minute = 1200
retry_pause_ms = 100
"#;
        let config = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();

        let mock = Arc::new(MockMessenger::new());
        let dispatcher = Dispatcher::new(
            DispatcherConfig {
                channel: ChannelId::new(config.telegram.channel.as_str()),
                rate_per_minute: config.dispatch.rate_per_minute,
                retry_pause: config.dispatch.retry_pause(),
                send_options: SendOptions {
                    parse_mode: ParseMode::Html,
                    disable_link_preview: true,
                },
            },
            Arc::clone(&mock),
        );

        let mut raw = event("markup");
        raw.center_name = Some("VFS <North> & Co".into());
        dispatcher.enqueue(raw);
        wait_until_idle(&dispatcher).await;

        let delivered = mock.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].channel, ChannelId::new("@visa_slots"));
        assert!(delivered[0].text.contains("VFS &lt;North&gt; &amp; Co"));
        assert!(!delivered[0].text.contains("<North>"));
    }

    /// Formatting the same event twice yields identical bytes.
    #[test]
    fn test_formatting_is_pure() {
        let raw = event("pure");
        assert_eq!(formatter::render(&raw), formatter::render(&raw));
    }

    #[tokio::test]
    async fn test_wait_until_idle_helper_reports_metrics() {
        let (_mock, dispatcher) = dispatcher_with(6_000, Duration::from_millis(50));
        dispatcher.enqueue(event("m1"));
        dispatcher.enqueue(event("m2"));
        wait_until_idle(&dispatcher).await;

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.enqueued_count, 2);
        assert_eq!(snapshot.sent_count, 2);
        assert_eq!(snapshot.queue_depth, 0);
    }
}
