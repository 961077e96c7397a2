//! Dispatch pipeline: event intake -> dispatcher -> Telegram.
//!
//! The upstream slot checker is a separate process; events arrive here
//! as JSON Lines on stdin or from a file, get enqueued, and the
//! pipeline waits (bounded) for the queue to drain before exiting.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use contracts::{AppointmentEvent, ChannelId, HeraldConfig, Messenger, ParseMode, SendOptions};
use dispatcher::{Dispatcher, DispatcherConfig};
use messenger::TelegramClient;

/// Pipeline configuration
pub struct PipelineConfig {
    /// Validated application configuration.
    pub config: HeraldConfig,
    /// Events file (JSON Lines); None reads stdin.
    pub events_path: Option<PathBuf>,
    /// Prometheus port (None = disabled).
    pub metrics_port: Option<u16>,
    /// How long to wait for the queue to drain after intake ends.
    pub drain_grace: Duration,
}

/// Final counters reported after a pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineReport {
    pub enqueued: u64,
    pub sent: u64,
    pub retried: u64,
    pub dropped: u64,
    /// Events still pending when the drain grace period expired.
    pub abandoned: usize,
    /// Intake lines that failed to parse and were skipped.
    pub skipped_lines: u64,
}

/// The dispatch pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run intake and dispatch to completion.
    pub async fn run(self) -> Result<PipelineReport> {
        let herald = &self.config.config;

        let client = TelegramClient::new(&herald.telegram.bot_token)
            .context("Failed to build Telegram client")?;

        let dispatcher = Dispatcher::new(
            DispatcherConfig {
                channel: ChannelId::new(herald.telegram.channel.as_str()),
                rate_per_minute: herald.dispatch.rate_per_minute,
                retry_pause: herald.dispatch.retry_pause(),
                send_options: SendOptions {
                    parse_mode: ParseMode::Html,
                    disable_link_preview: true,
                },
            },
            client,
        );

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)
                .context("Failed to start metrics endpoint")?;
        }

        let stats_handle = tokio::spawn(stats_loop(dispatcher.clone()));

        let verbose_intake = herald.debug;
        let skipped_lines = match &self.config.events_path {
            Some(path) => {
                info!(events = %path.display(), "Reading events from file");
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open events file {}", path.display()))?;
                feed_events(BufReader::new(file), &dispatcher, verbose_intake).await?
            }
            None => {
                info!("Reading events from stdin");
                feed_events(BufReader::new(tokio::io::stdin()), &dispatcher, verbose_intake)
                    .await?
            }
        };

        info!(
            pending = dispatcher.pending_len(),
            "Event intake finished, draining pending queue"
        );
        let abandoned = wait_for_drain(&dispatcher, self.config.drain_grace).await;

        stats_handle.abort();

        let snapshot = dispatcher.metrics();
        observability::record_dispatch_counters(
            snapshot.queue_depth,
            snapshot.enqueued_count,
            snapshot.sent_count,
            snapshot.retried_count,
            snapshot.dropped_count,
        );

        Ok(PipelineReport {
            enqueued: snapshot.enqueued_count,
            sent: snapshot.sent_count,
            retried: snapshot.retried_count,
            dropped: snapshot.dropped_count,
            abandoned,
            skipped_lines,
        })
    }
}

/// Enqueue events from a JSON Lines reader.
///
/// Unparseable lines are logged and skipped so one bad record cannot
/// stall the feed. Returns the number of skipped lines.
async fn feed_events<R, M>(
    reader: R,
    dispatcher: &Dispatcher<M>,
    verbose: bool,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    M: Messenger + Send + Sync + 'static,
{
    let mut lines = reader.lines();
    let mut skipped = 0u64;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<AppointmentEvent>(line) {
            Ok(event) => {
                if verbose {
                    info!(event_id = %event.id, status = %event.status, "Event enqueued");
                }
                dispatcher.enqueue(event);
            }
            Err(e) => {
                skipped += 1;
                let preview: String = line.chars().take(200).collect();
                warn!(error = %e, line = %preview, "Skipping unparseable event line");
            }
        }
    }

    Ok(skipped)
}

/// Wait (bounded) for the queue to empty and the drain loop to stop.
///
/// Returns the number of events abandoned when the grace period ran
/// out.
async fn wait_for_drain<M>(dispatcher: &Dispatcher<M>, grace: Duration) -> usize
where
    M: Messenger + Send + Sync + 'static,
{
    let deadline = tokio::time::Instant::now() + grace;

    while tokio::time::Instant::now() < deadline {
        if dispatcher.pending_len() == 0 && !dispatcher.is_draining() {
            return 0;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    let abandoned = dispatcher.pending_len();
    if abandoned > 0 {
        warn!(abandoned, "Drain grace period expired, abandoning pending events");
    }
    abandoned
}

/// Periodically mirror dispatcher counters into the metrics recorder.
async fn stats_loop<M>(dispatcher: Dispatcher<M>)
where
    M: Messenger + Send + Sync + 'static,
{
    let mut interval = tokio::time::interval(Duration::from_secs(10));
    loop {
        interval.tick().await;
        let snapshot = dispatcher.metrics();
        observability::record_dispatch_counters(
            snapshot.queue_depth,
            snapshot.enqueued_count,
            snapshot.sent_count,
            snapshot.retried_count,
            snapshot.dropped_count,
        );
        debug!(
            queue_depth = snapshot.queue_depth,
            sent = snapshot.sent_count,
            retried = snapshot.retried_count,
            dropped = snapshot.dropped_count,
            "Dispatch stats"
        );
    }
}
