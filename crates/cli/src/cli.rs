//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Slot Herald - appointment slot announcements for a Telegram channel
#[derive(Parser, Debug)]
#[command(
    name = "slot-herald",
    author,
    version,
    about = "Announces visa appointment slot events to a Telegram channel",
    long_about = "Reads appointment-status events, formats them as HTML messages and \n\
                  delivers them to a single Telegram channel in order, at a bounded \n\
                  rate, retrying transient delivery failures."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SLOT_HERALD_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SLOT_HERALD_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read events and dispatch them to the channel
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),

    /// Display resolved configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "slot-herald.toml",
        env = "SLOT_HERALD_CONFIG"
    )]
    pub config: PathBuf,

    /// Read events (JSON Lines) from this file instead of stdin
    #[arg(long, env = "SLOT_HERALD_EVENTS")]
    pub events: Option<PathBuf>,

    /// Override the bot token from configuration
    #[arg(long, env = "SLOT_HERALD_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Override the destination channel from configuration
    #[arg(long, env = "SLOT_HERALD_CHANNEL")]
    pub channel: Option<String>,

    /// Override sends-per-minute from configuration
    #[arg(long, env = "SLOT_HERALD_RATE")]
    pub rate_per_minute: Option<u32>,

    /// Validate configuration and exit without dispatching
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "SLOT_HERALD_METRICS_PORT")]
    pub metrics_port: u16,

    /// Seconds to wait for the pending queue to drain after intake ends
    #[arg(long, default_value = "30", env = "SLOT_HERALD_DRAIN_GRACE")]
    pub drain_grace_secs: u64,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "slot-herald.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "slot-herald.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
