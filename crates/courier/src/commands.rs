// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot queue commands: `send`, `retry`, `cancel`, `clear`.
//!
//! These assume the single-owner model: one courier process at a time
//! works against the database. `send` and `retry` run a full delivery
//! attempt inline and report how it resolved; `cancel` and `clear` only
//! rewrite the snapshot and never talk to the endpoint.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use courier_config::CourierConfig;
use courier_config::model::QueueConfig;
use courier_core::{Clock, CourierError, KvStore, QueueEvent, SystemClock};
use courier_queue::{
    BackoffPolicy, BroadcastNotifier, ErrorLog, MessageQueue, QueueSettings, QueueState,
    RetryPolicy,
};
use courier_storage::SqliteStore;
use tokio::sync::broadcast;

use crate::dispatch::HttpDispatcher;

/// Maps the `[queue]` config section onto queue tunables.
pub(crate) fn queue_settings(queue: &QueueConfig) -> QueueSettings {
    QueueSettings {
        policy: RetryPolicy {
            backoff: BackoffPolicy {
                base_delay_ms: queue.base_delay_ms,
                growth_factor: queue.growth_factor,
                max_delay_ms: queue.max_delay_ms,
            },
            max_retries: queue.max_retries,
            lock_timeout_ms: queue.lock_timeout_ms,
        },
        error_log_capacity: queue.error_log_capacity,
    }
}

/// Full delivery wiring for commands that dispatch: store, queue, and a
/// subscription opened before anything can happen.
async fn delivery_queue(
    config: &CourierConfig,
) -> Result<(SqliteStore, MessageQueue, broadcast::Receiver<QueueEvent>), CourierError> {
    let dispatcher = Arc::new(HttpDispatcher::from_config(&config.endpoint)?);
    let store = SqliteStore::open(&config.storage.database_path).await?;
    let notifier = Arc::new(BroadcastNotifier::default());
    let events = notifier.subscribe();
    let queue = MessageQueue::new(
        Arc::new(store.clone()),
        dispatcher,
        notifier,
        Arc::new(SystemClock),
        queue_settings(&config.queue),
    );
    Ok((store, queue, events))
}

/// Snapshot-only wiring for commands that must not trigger delivery.
fn offline_state(config: &CourierConfig, store: &SqliteStore) -> QueueState {
    let store: Arc<dyn KvStore> = Arc::new(store.clone());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let error_log = Arc::new(ErrorLog::new(
        store.clone(),
        clock.clone(),
        config.queue.error_log_capacity,
    ));
    QueueState::new(
        store,
        Arc::new(BroadcastNotifier::default()),
        clock,
        error_log,
    )
}

/// How one message's attempt resolved, reconstructed from the events
/// published while draining.
enum SendOutcome {
    Sent,
    Scheduled {
        retry_count: u32,
        next_retry_at: DateTime<Utc>,
    },
    Failed {
        error: String,
    },
}

/// Drains buffered events and keeps the latest lifecycle event for `id`.
fn outcome_for(events: &mut broadcast::Receiver<QueueEvent>, id: &str) -> Option<SendOutcome> {
    let mut outcome = None;
    while let Ok(event) = events.try_recv() {
        match event {
            QueueEvent::MessageSent { id: event_id } if event_id == id => {
                outcome = Some(SendOutcome::Sent);
            }
            QueueEvent::MessageFailed {
                id: event_id,
                error,
            } if event_id == id => {
                outcome = Some(SendOutcome::Failed { error });
            }
            QueueEvent::MessageRetry {
                id: event_id,
                retry_count,
                next_retry_at,
            } if event_id == id => {
                outcome = Some(SendOutcome::Scheduled {
                    retry_count,
                    next_retry_at,
                });
            }
            _ => {}
        }
    }
    outcome
}

fn report_outcome(id: &str, outcome: Option<SendOutcome>) -> Result<(), CourierError> {
    match outcome {
        Some(SendOutcome::Sent) => {
            println!("message {id} delivered");
            Ok(())
        }
        Some(SendOutcome::Scheduled {
            retry_count,
            next_retry_at,
        }) => {
            println!(
                "message {id} queued after {retry_count} failed attempt(s); next retry at {}",
                next_retry_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("run `courier serve` to keep retrying in the background");
            Ok(())
        }
        Some(SendOutcome::Failed { error }) => Err(CourierError::dispatch(error)),
        None => {
            println!("message {id} queued");
            Ok(())
        }
    }
}

/// Runs the `courier send` command.
pub async fn run_send(
    config: &CourierConfig,
    content: String,
    conversation: String,
    assistant: Option<String>,
) -> Result<(), CourierError> {
    let (store, queue, mut events) = delivery_queue(config).await?;

    let backlog = queue.initialize().await;
    if !backlog.is_empty() {
        println!(
            "recovered {} queued message(s) from a previous run",
            backlog.len()
        );
    }

    let accepted = queue.enqueue(content, conversation, assistant).await;
    let result = report_outcome(&accepted.id, outcome_for(&mut events, &accepted.id));

    store.close().await?;
    result
}

/// Runs the `courier retry` command.
pub async fn run_retry(config: &CourierConfig, id: &str) -> Result<(), CourierError> {
    let (store, queue, mut events) = delivery_queue(config).await?;

    queue.initialize().await;
    let retried = queue.retry(id).await;
    let outcome = outcome_for(&mut events, id);

    let result = match retried {
        Ok(()) => report_outcome(id, outcome),
        // Recovery may already have delivered the message before the
        // reset could find it.
        Err(CourierError::NotFound { .. }) if matches!(outcome, Some(SendOutcome::Sent)) => {
            println!("message {id} was delivered while recovering the queue");
            Ok(())
        }
        Err(err) => Err(err),
    };

    store.close().await?;
    result
}

/// Runs the `courier cancel` command.
pub async fn run_cancel(config: &CourierConfig, id: &str) -> Result<(), CourierError> {
    let store = SqliteStore::open(&config.storage.database_path).await?;
    let state = offline_state(config, &store);

    state.load().await;
    let removed = state.remove(id).await;
    store.close().await?;

    if removed {
        println!("message {id} cancelled");
        Ok(())
    } else {
        Err(CourierError::NotFound { id: id.to_string() })
    }
}

/// Runs the `courier clear` command.
pub async fn run_clear(config: &CourierConfig) -> Result<(), CourierError> {
    let store = SqliteStore::open(&config.storage.database_path).await?;
    let state = offline_state(config, &store);

    let restored = state.load().await;
    state.clear().await;
    store.close().await?;

    println!("cleared {} message(s)", restored.len());
    Ok(())
}
