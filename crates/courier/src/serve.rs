// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier serve` command implementation.
//!
//! Recovers the persisted queue, drains whatever is already eligible,
//! then keeps delivering until SIGINT/SIGTERM: retry timers wake the
//! processor on schedule, and a periodic sweep catches anything that
//! became eligible while the daemon sat idle. Queue lifecycle events
//! are mirrored into the log from the notification channel.

use std::sync::Arc;
use std::time::Duration;

use courier_config::CourierConfig;
use courier_core::{CourierError, QueueEvent, SystemClock};
use courier_queue::{BroadcastNotifier, MessageQueue};
use courier_storage::SqliteStore;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::commands::queue_settings;
use crate::dispatch::HttpDispatcher;
use crate::shutdown;

/// Runs the `courier serve` command.
pub async fn run_serve(config: CourierConfig) -> Result<(), CourierError> {
    init_tracing(&config.daemon.log_level);

    info!("starting courier serve");

    let dispatcher = Arc::new(HttpDispatcher::from_config(&config.endpoint).map_err(|err| {
        error!(error = %err, "failed to initialize delivery endpoint");
        eprintln!(
            "error: delivery endpoint required. Set endpoint.url in courier.toml or COURIER_ENDPOINT_URL."
        );
        err
    })?);

    let store = SqliteStore::open(&config.storage.database_path).await?;
    info!(path = config.storage.database_path.as_str(), "database opened");

    let notifier = Arc::new(BroadcastNotifier::default());
    let events = notifier.subscribe();

    let queue = Arc::new(MessageQueue::new(
        Arc::new(store.clone()),
        dispatcher,
        notifier.clone(),
        Arc::new(SystemClock),
        queue_settings(&config.queue),
    ));

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    // Mirror queue events into the log.
    {
        let event_cancel = cancel.clone();
        tokio::spawn(async move {
            log_queue_events(events, event_cancel).await;
        });
    }

    // Crash recovery: reload the snapshot and work off the backlog.
    let recovered = queue.initialize().await;
    if !recovered.is_empty() {
        info!(count = recovered.len(), "recovered queued messages from previous run");
    }

    // Safety-net sweep. Retry timers drive the normal rhythm; the sweep
    // picks up entries whose timers died with a previous incarnation.
    let mut sweep = tokio::time::interval(Duration::from_secs(config.daemon.poll_interval_secs));
    // Skip the first immediate tick.
    sweep.tick().await;

    info!(
        poll_interval_secs = config.daemon.poll_interval_secs,
        "courier serve ready"
    );

    loop {
        tokio::select! {
            _ = sweep.tick() => {
                queue.process().await;
            }
            _ = cancel.cancelled() => {
                break;
            }
        }
    }

    store.close().await?;
    info!("courier serve shutdown complete");
    Ok(())
}

/// Logs queue lifecycle events from the notification channel until the
/// channel closes or shutdown is requested.
async fn log_queue_events(
    mut events: broadcast::Receiver<QueueEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(QueueEvent::QueueUpdated { queue }) => {
                    debug!(depth = queue.len(), "queue updated");
                }
                Ok(QueueEvent::MessageSent { id }) => {
                    debug!(id = %id, "event: message sent");
                }
                Ok(QueueEvent::MessageFailed { id, error }) => {
                    debug!(id = %id, error = %error, "event: message failed");
                }
                Ok(QueueEvent::MessageRetry { id, retry_count, next_retry_at }) => {
                    debug!(
                        id = %id,
                        retry_count,
                        next_retry_at = %next_retry_at,
                        "event: retry scheduled"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "queue event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            },
            _ = cancel.cancelled() => {
                break;
            }
        }
    }
    debug!("queue event logger stopped");
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "courier={log_level},courier_queue={log_level},courier_storage={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
