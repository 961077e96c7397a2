//! Messenger trait - the outbound bot API seam.
//!
//! Abstracts the chat endpoint so the dispatcher can be exercised
//! against a mock and the real client can be swapped without touching
//! the queue logic.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::SendError;

/// Destination channel identifier: `@username` or a numeric chat id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Markup mode the formatted text targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    #[default]
    Html,
    MarkdownV2,
}

impl ParseMode {
    /// Wire value expected by the bot API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::MarkdownV2 => "MarkdownV2",
        }
    }
}

/// Per-message send options.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub parse_mode: ParseMode,
    pub disable_link_preview: bool,
}

/// Outbound message client trait
///
/// One method, mirroring the bot API `sendMessage` contract. Errors
/// carry the retriable/non-retriable classification the dispatcher's
/// retry policy depends on.
#[trait_variant::make(Messenger: Send)]
pub trait LocalMessenger {
    /// Deliver one formatted message to the channel.
    async fn send_message(
        &self,
        channel: &ChannelId,
        text: &str,
        options: &SendOptions,
    ) -> Result<(), SendError>;
}

impl<M> Messenger for Arc<M>
where
    M: Messenger + Send + Sync,
{
    async fn send_message(
        &self,
        channel: &ChannelId,
        text: &str,
        options: &SendOptions,
    ) -> Result<(), SendError> {
        (**self).send_message(channel, text, options).await
    }
}
