//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use config_loader::ConfigLoader;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_dispatch(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut config = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI/env overrides
    if let Some(ref token) = args.bot_token {
        info!("Overriding bot token from CLI/env");
        config.telegram.bot_token = token.clone();
    }
    if let Some(ref channel) = args.channel {
        info!(channel = %channel, "Overriding channel from CLI/env");
        config.telegram.channel = channel.clone();
    }
    if let Some(rate) = args.rate_per_minute {
        info!(rate_per_minute = rate, "Overriding send rate from CLI/env");
        config.dispatch.rate_per_minute = rate;
    }

    info!(
        channel = %config.telegram.channel,
        rate_per_minute = config.dispatch.rate_per_minute,
        retry_pause_ms = config.dispatch.retry_pause_ms,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        return Ok(());
    }

    if let Some(ref events) = args.events {
        if !events.exists() {
            return Err(CliError::events_file_not_found(events.display().to_string()).into());
        }
    }

    let pipeline = Pipeline::new(PipelineConfig {
        config,
        events_path: args.events.clone(),
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        drain_grace: Duration::from_secs(args.drain_grace_secs),
    });

    info!("Starting dispatch pipeline...");

    tokio::select! {
        result = pipeline.run() => {
            let report = result.map_err(|e| CliError::pipeline_execution(e.to_string()))?;
            info!(
                enqueued = report.enqueued,
                sent = report.sent,
                retried = report.retried,
                dropped = report.dropped,
                abandoned = report.abandoned,
                skipped_lines = report.skipped_lines,
                "Dispatch pipeline finished"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            // In-flight queue is abandoned on process exit.
            warn!("Interrupted, abandoning pending queue");
        }
    }

    Ok(())
}
