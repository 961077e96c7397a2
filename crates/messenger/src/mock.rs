//! Mock messenger
//!
//! Scriptable implementation for unit and integration tests, supporting
//! failure-injection scenarios and delivery-order assertions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use contracts::{ChannelId, Messenger, SendError, SendOptions};

/// One successfully delivered message.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub channel: ChannelId,
    pub text: String,
    /// When the mock accepted the message (for rate-spacing checks).
    pub at: Instant,
}

/// Mock messenger with scriptable outcomes
///
/// Outcomes queued with [`push_outcome`](Self::push_outcome) are
/// consumed one per call; once the script is exhausted every call
/// succeeds. Every attempt is counted, successful ones are recorded
/// with a timestamp.
#[derive(Default)]
pub struct MockMessenger {
    outcomes: Mutex<VecDeque<Result<(), SendError>>>,
    sent: Mutex<Vec<SentMessage>>,
    attempts: AtomicU64,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome for the next unscripted call.
    pub fn push_outcome(&self, outcome: Result<(), SendError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Total delivery attempts, including failed ones.
    pub fn attempt_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Successfully delivered messages, in delivery order.
    pub fn delivered(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Messenger for MockMessenger {
    async fn send_message(
        &self,
        channel: &ChannelId,
        text: &str,
        _options: &SendOptions,
    ) -> Result<(), SendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));

        if outcome.is_ok() {
            self.sent.lock().unwrap().push(SentMessage {
                channel: channel.clone(),
                text: text.to_string(),
                at: Instant::now(),
            });
        }
        outcome
    }
}
