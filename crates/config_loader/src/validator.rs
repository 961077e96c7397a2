//! Configuration validation
//!
//! Rules:
//! - declared field constraints (rate range, retry pause, non-empty strings)
//! - bot token shaped like `<bot id>:<secret>`
//! - channel is `@username` or a numeric chat id

use contracts::{HeraldConfig, HeraldError};
use validator::Validate;

/// Validate a parsed configuration.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &HeraldConfig) -> Result<(), HeraldError> {
    config
        .validate()
        .map_err(|e| HeraldError::config_validation("config", e.to_string()))?;
    validate_bot_token(&config.telegram.bot_token)?;
    validate_channel(&config.telegram.channel)?;
    Ok(())
}

/// BotFather tokens are `<numeric bot id>:<secret>`.
fn validate_bot_token(token: &str) -> Result<(), HeraldError> {
    let mut parts = token.splitn(2, ':');
    let id = parts.next().unwrap_or_default();
    let secret = parts.next().unwrap_or_default();

    if id.is_empty() || secret.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(HeraldError::config_validation(
            "telegram.bot_token",
            "expected '<bot id>:<secret>' as issued by BotFather",
        ));
    }
    Ok(())
}

fn validate_channel(channel: &str) -> Result<(), HeraldError> {
    if let Some(username) = channel.strip_prefix('@') {
        let valid = username.len() >= 5
            && username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            return Ok(());
        }
        return Err(HeraldError::config_validation(
            "telegram.channel",
            "channel username must be at least 5 characters of [A-Za-z0-9_]",
        ));
    }

    if channel.parse::<i64>().is_ok() {
        return Ok(());
    }

    Err(HeraldError::config_validation(
        "telegram.channel",
        "expected '@username' or a numeric chat id",
    ))
}
