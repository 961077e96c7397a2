//! Telegram Bot API client.
//!
//! Thin wrapper over the `sendMessage` method carrying the error
//! classification the dispatcher's retry policy relies on.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use contracts::{ChannelId, HeraldError, Messenger, SendError, SendOptions};

const API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram Bot API client
pub struct TelegramClient {
    http: reqwest::Client,
    send_message_url: String,
}

impl TelegramClient {
    /// Create a client for the given bot token.
    pub fn new(bot_token: &str) -> Result<Self, HeraldError> {
        Self::with_base_url(API_BASE, bot_token)
    }

    /// Create a client against a custom API base (test servers).
    pub fn with_base_url(base_url: &str, bot_token: &str) -> Result<Self, HeraldError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HeraldError::api_client(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            send_message_url: format!(
                "{}/bot{}/sendMessage",
                base_url.trim_end_matches('/'),
                bot_token
            ),
        })
    }
}

/// Response envelope returned by every bot API method.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

/// Map a non-ok API response to a `SendError`.
///
/// Structured classification first: transport-level throttling (429)
/// and server errors (5xx) are always transient. Only for 400s, where
/// the API exposes nothing beyond the description text, does this fall
/// back to substring matching.
fn classify_response(status: u16, response: &ApiResponse) -> SendError {
    let description = response
        .description
        .as_deref()
        .unwrap_or("no description provided");

    if status == 429 {
        let retry_after = response
            .parameters
            .as_ref()
            .and_then(|p| p.retry_after)
            .unwrap_or(0);
        return SendError::transient(format!(
            "rate limited by endpoint (retry_after={retry_after}s): {description}"
        ));
    }
    if status >= 500 {
        return SendError::transient(format!("endpoint error {status}: {description}"));
    }
    if status == 400 {
        return SendError::classify_description(description);
    }
    SendError::transient(format!("unexpected endpoint status {status}: {description}"))
}

impl Messenger for TelegramClient {
    #[instrument(
        name = "telegram_send_message",
        skip(self, text, options),
        fields(channel = %channel, text_len = text.len())
    )]
    async fn send_message(
        &self,
        channel: &ChannelId,
        text: &str,
        options: &SendOptions,
    ) -> Result<(), SendError> {
        let payload = serde_json::json!({
            "chat_id": channel.as_str(),
            "text": text,
            "parse_mode": options.parse_mode.as_api_str(),
            "disable_web_page_preview": options.disable_link_preview,
        });

        let response = self
            .http
            .post(&self.send_message_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SendError::transient(format!("request timed out: {e}"))
                } else {
                    SendError::transient(format!("network error: {e}"))
                }
            })?;

        let status = response.status().as_u16();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| SendError::transient(format!("unreadable endpoint response: {e}")))?;

        if body.ok {
            debug!("message delivered");
            return Ok(());
        }

        let err = classify_response(status, &body);
        warn!(status, error = %err, "sendMessage rejected");
        Err(err)
    }
}
