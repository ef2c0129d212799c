// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable outbound message queue with single-flight delivery.
//!
//! Messages are accepted immediately, persisted as a full snapshot
//! after every mutation, and handed to a [`courier_core::Dispatcher`]
//! one at a time. Failed attempts back off exponentially and give up
//! after a bounded number of retries; an interrupted run is recovered
//! from the stored snapshot at startup. Delivery is at-least-once: a
//! crash between a successful dispatch and the snapshot write means the
//! same message goes out again on the next run.
//!
//! [`MessageQueue`] is the facade wiring together [`state::QueueState`]
//! (durable state), [`processor::QueueProcessor`] (single-flight drain
//! loop and retry timers), and [`report::ErrorLog`] (operator-facing
//! failure log).

pub mod backoff;
pub mod notify;
pub mod processor;
pub mod report;
pub mod state;

pub use backoff::{BackoffPolicy, RetryPolicy};
pub use notify::BroadcastNotifier;
pub use processor::QueueProcessor;
pub use report::{DEFAULT_ERROR_LOG_CAPACITY, ERROR_LOG_KEY, ErrorLog};
pub use state::{QUEUE_KEY, QueueState};

use std::sync::Arc;

use courier_core::{
    Clock, CourierError, Dispatcher, KvStore, MessageStatus, Notifier, QueuedMessage,
};
use uuid::Uuid;

/// Tunables for a [`MessageQueue`], usually mapped from configuration.
#[derive(Debug, Clone, Copy)]
pub struct QueueSettings {
    pub policy: RetryPolicy,
    pub error_log_capacity: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            error_log_capacity: DEFAULT_ERROR_LOG_CAPACITY,
        }
    }
}

pub struct MessageQueue {
    state: Arc<QueueState>,
    processor: Arc<QueueProcessor>,
    error_log: Arc<ErrorLog>,
    clock: Arc<dyn Clock>,
}

impl MessageQueue {
    pub fn new(
        store: Arc<dyn KvStore>,
        dispatcher: Arc<dyn Dispatcher>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        settings: QueueSettings,
    ) -> Self {
        let error_log = Arc::new(ErrorLog::new(
            store.clone(),
            clock.clone(),
            settings.error_log_capacity,
        ));
        let state = Arc::new(QueueState::new(
            store,
            notifier.clone(),
            clock.clone(),
            error_log.clone(),
        ));
        let processor = QueueProcessor::new(
            state.clone(),
            dispatcher,
            notifier,
            clock.clone(),
            error_log.clone(),
            settings.policy,
        );
        Self {
            state,
            processor,
            error_log,
            clock,
        }
    }

    /// Restores the persisted snapshot and starts working on whatever
    /// it left behind. Returns the recovered messages so the caller can
    /// report the backlog.
    pub async fn initialize(&self) -> Vec<QueuedMessage> {
        let recovered = self.state.load().await;
        if !recovered.is_empty() {
            self.processor.process().await;
        }
        recovered
    }

    /// Accepts a message and immediately tries to deliver it. The
    /// returned copy reflects the entry as accepted, before any
    /// delivery attempt.
    pub async fn enqueue(
        &self,
        content: impl Into<String>,
        conversation_id: impl Into<String>,
        assistant_id: Option<String>,
    ) -> QueuedMessage {
        let message = QueuedMessage {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            conversation_id: conversation_id.into(),
            assistant_id,
            timestamp: self.clock.now(),
            retry_count: 0,
            status: MessageStatus::Pending,
            error: None,
            lock_until: None,
        };
        self.state.add(message.clone()).await;
        self.processor.process().await;
        message
    }

    /// Manual trigger, used by periodic sweeps and connectivity-restored
    /// hooks. Collapses into a no-op while a drain is already running.
    pub async fn process(&self) {
        self.processor.process().await;
    }

    /// Drops a message and its pending retry timer. Returns whether the
    /// message was still queued.
    pub async fn cancel(&self, id: &str) -> bool {
        self.processor.cancel_timer(id).await;
        self.state.remove(id).await
    }

    /// Puts a message back at the start of its retry schedule and kicks
    /// off delivery right away.
    pub async fn retry(&self, id: &str) -> Result<(), CourierError> {
        self.processor.cancel_timer(id).await;
        self.state.reset_for_retry(id).await?;
        self.processor.process().await;
        Ok(())
    }

    /// Drops every queued message and all pending retry timers.
    pub async fn clear(&self) {
        self.processor.cancel_all_timers().await;
        self.state.clear().await;
    }

    pub async fn snapshot(&self) -> Vec<QueuedMessage> {
        self.state.snapshot().await
    }

    pub async fn is_empty(&self) -> bool {
        self.state.is_empty().await
    }

    pub async fn len(&self) -> usize {
        self.state.len().await
    }

    pub fn error_log(&self) -> Arc<ErrorLog> {
        self.error_log.clone()
    }
}
