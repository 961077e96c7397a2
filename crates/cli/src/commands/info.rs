//! `info` command implementation.

use anyhow::Result;
use serde::Serialize;

use config_loader::ConfigLoader;

use crate::cli::InfoArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ConfigSummary {
    bot: String,
    channel: String,
    rate_per_minute: u32,
    retry_pause_ms: u64,
    min_send_gap_ms: u64,
    debug: bool,
    version: &'static str,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = ConfigLoader::load_from_path(&args.config)?;

    let summary = ConfigSummary {
        bot: redact_token(&config.telegram.bot_token),
        channel: config.telegram.channel.clone(),
        rate_per_minute: config.dispatch.rate_per_minute,
        retry_pause_ms: config.dispatch.retry_pause_ms,
        min_send_gap_ms: config.dispatch.min_send_gap().as_millis() as u64,
        debug: config.debug,
        version: env!("CARGO_PKG_VERSION"),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("slot-herald {}", summary.version);
        println!("  bot:             {}", summary.bot);
        println!("  channel:         {}", summary.channel);
        println!("  rate/minute:     {}", summary.rate_per_minute);
        println!("  min send gap:    {}ms", summary.min_send_gap_ms);
        println!("  retry pause:     {}ms", summary.retry_pause_ms);
        println!("  debug logging:   {}", summary.debug);
    }

    Ok(())
}

/// Keep the public bot id, never print the secret half of the token.
fn redact_token(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) => format!("{id}:***"),
        None => "***".to_string(),
    }
}
