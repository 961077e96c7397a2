//! Layered error definitions
//!
//! `SendError` classifies delivery failures at the bot API seam;
//! `HeraldError` covers configuration and wiring failures.

use thiserror::Error;

/// Delivery failure at the send boundary.
///
/// The dispatcher's retry policy branches on exactly this
/// classification: `Transient` is requeued and retried after a pause,
/// `Content` is logged and dropped because retrying the same payload
/// cannot succeed.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    /// The endpoint rejected the payload itself.
    #[error("content rejected by endpoint: {message}")]
    Content { message: String },

    /// Network, throttling or timeout class failure worth retrying.
    #[error("transient send failure: {message}")]
    Transient { message: String },
}

impl SendError {
    pub fn content(message: impl Into<String>) -> Self {
        Self::Content {
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// True when retrying the same payload may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Fallback classifier for endpoints that only expose an error
    /// string.
    ///
    /// Substring matching is brittle; clients should classify from
    /// structured information (HTTP class, retry-after hints) first and
    /// reach for this only where the endpoint gives nothing better than
    /// the description text.
    pub fn classify_description(description: &str) -> Self {
        const CONTENT_MARKERS: [&str; 4] = [
            "can't parse entities",
            "bad request",
            "message is too long",
            "message text is empty",
        ];

        let lowered = description.to_ascii_lowercase();
        if CONTENT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            Self::content(description)
        } else {
            Self::transient(description)
        }
    }
}

/// Unified error type for configuration and client wiring.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Bot API client construction error
    #[error("api client error: {message}")]
    ApiClient { message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl HeraldError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create bot API client error
    pub fn api_client(message: impl Into<String>) -> Self {
        Self::ApiClient {
            message: message.into(),
        }
    }
}
