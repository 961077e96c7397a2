//! Runtime configuration contracts shared across crates.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HeraldConfig {
    #[validate(nested)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    #[validate(nested)]
    pub dispatch: DispatchConfig,

    /// Gates debug-level delivery logging.
    #[serde(default)]
    pub debug: bool,
}

/// Bot credential and destination channel.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TelegramConfig {
    /// Token issued by BotFather, shaped `<bot id>:<secret>`.
    #[validate(length(min = 1))]
    pub bot_token: String,

    /// Destination channel: `@username` or a numeric chat id.
    #[validate(length(min = 1))]
    pub channel: String,
}

/// Outbound queue tuning.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchConfig {
    /// Successful sends allowed per 60 seconds.
    #[serde(default = "default_rate_per_minute")]
    #[validate(range(min = 1, max = 1200))]
    pub rate_per_minute: u32,

    /// Pause after a transient delivery failure, in milliseconds.
    #[serde(default = "default_retry_pause_ms")]
    #[validate(range(min = 1))]
    pub retry_pause_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            rate_per_minute: default_rate_per_minute(),
            retry_pause_ms: default_retry_pause_ms(),
        }
    }
}

impl DispatchConfig {
    /// Minimum wall-clock gap between two successful sends.
    pub fn min_send_gap(&self) -> Duration {
        Duration::from_millis(60_000 / u64::from(self.rate_per_minute.max(1)))
    }

    /// Pause applied after a transient delivery failure.
    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }
}

// Telegram caps channel posts at ~20/min; stay at the ceiling by default.
fn default_rate_per_minute() -> u32 {
    20
}

fn default_retry_pause_ms() -> u64 {
    5_000
}
