// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory queue state and its durable snapshot.
//!
//! The in-memory list is authoritative while the process runs. Every
//! mutation rewrites the full serialized snapshot under one fixed key
//! and then announces the new queue contents, in that order, while the
//! entry lock is still held so snapshots and announcements cannot
//! interleave across concurrent mutations.

use std::sync::Arc;

use courier_core::{
    Clock, CourierError, KvStore, MessageStatus, Notifier, QueueEvent, QueuedMessage,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::report::ErrorLog;

/// Storage key holding the serialized queue snapshot.
pub const QUEUE_KEY: &str = "message_queue";

pub struct QueueState {
    store: Arc<dyn KvStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    error_log: Arc<ErrorLog>,
    entries: Mutex<Vec<QueuedMessage>>,
}

impl QueueState {
    pub fn new(
        store: Arc<dyn KvStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        error_log: Arc<ErrorLog>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            error_log,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Restores the snapshot left by a previous run.
    ///
    /// Entries stuck in `sending` are flipped back to `pending` with
    /// their lock untouched, so an interrupted attempt still waits out
    /// its lock window before being retried. The corrected snapshot is
    /// persisted before anyone gets to process it. A missing snapshot
    /// starts empty; an unreadable one is reported and discarded.
    pub async fn load(&self) -> Vec<QueuedMessage> {
        let stored = match self.store.get(QUEUE_KEY).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "failed to load queue snapshot");
                self.error_log
                    .record(format!("failed to load message queue: {err}"), None)
                    .await;
                return Vec::new();
            }
        };
        let Some(json) = stored else {
            return Vec::new();
        };
        let mut restored: Vec<QueuedMessage> = match serde_json::from_str(&json) {
            Ok(restored) => restored,
            Err(err) => {
                warn!(error = %err, "queue snapshot is corrupt, starting empty");
                self.error_log
                    .record(format!("failed to parse message queue snapshot: {err}"), None)
                    .await;
                return Vec::new();
            }
        };

        let mut interrupted = 0;
        for message in &mut restored {
            if message.status == MessageStatus::Sending {
                message.status = MessageStatus::Pending;
                interrupted += 1;
            }
        }
        if interrupted > 0 {
            info!(count = interrupted, "reset interrupted sends to pending");
        }

        let mut entries = self.entries.lock().await;
        *entries = restored;
        self.persist_locked(&entries).await;
        entries.clone()
    }

    pub async fn add(&self, message: QueuedMessage) {
        let mut entries = self.entries.lock().await;
        entries.push(message);
        self.persist_locked(&entries).await;
    }

    /// Removes the entry with `id`. Returns whether anything changed;
    /// removing an absent id is a safe no-op.
    pub async fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|message| message.id != id);
        let removed = entries.len() != before;
        if removed {
            self.persist_locked(&entries).await;
        }
        removed
    }

    /// Applies `apply` to the entry with `id` and persists. Returns
    /// `false` without persisting when the id is gone.
    pub async fn update<F>(&self, id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut QueuedMessage),
    {
        let mut entries = self.entries.lock().await;
        let Some(message) = entries.iter_mut().find(|message| message.id == id) else {
            return false;
        };
        apply(message);
        self.persist_locked(&entries).await;
        true
    }

    /// Rewinds a message for a fresh round of attempts: counter back to
    /// zero, pending, previous failure and lock cleared.
    pub async fn reset_for_retry(&self, id: &str) -> Result<(), CourierError> {
        let mut entries = self.entries.lock().await;
        let Some(message) = entries.iter_mut().find(|message| message.id == id) else {
            return Err(CourierError::NotFound { id: id.to_string() });
        };
        message.retry_count = 0;
        message.status = MessageStatus::Pending;
        message.error = None;
        message.lock_until = None;
        self.persist_locked(&entries).await;
        Ok(())
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.persist_locked(&entries).await;
    }

    /// First entry, in insertion order, that may be attempted right now.
    pub async fn first_eligible(&self) -> Option<QueuedMessage> {
        let now = self.clock.now();
        let entries = self.entries.lock().await;
        entries.iter().find(|message| message.is_eligible(now)).cloned()
    }

    pub async fn snapshot(&self) -> Vec<QueuedMessage> {
        self.entries.lock().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Serializes and stores the snapshot, then announces the new
    /// contents. A store that cannot take the write is reported and
    /// otherwise ignored; the in-memory list stays authoritative and
    /// the announcement still goes out.
    async fn persist_locked(&self, entries: &[QueuedMessage]) {
        match serde_json::to_string(entries) {
            Ok(json) => {
                if let Err(err) = self.store.set(QUEUE_KEY, json).await {
                    warn!(error = %err, "failed to persist queue snapshot");
                    self.error_log
                        .record(format!("failed to persist message queue: {err}"), None)
                        .await;
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to serialize queue snapshot");
            }
        }
        self.notifier
            .publish(QueueEvent::QueueUpdated {
                queue: entries.to_vec(),
            })
            .await;
    }
}
