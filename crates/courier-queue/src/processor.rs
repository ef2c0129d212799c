// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-flight queue processor.
//!
//! Any number of triggers may call [`QueueProcessor::process`]; a
//! process-wide flag guarantees that at most one message is in flight
//! at any moment. Per-message retry timers call back into the same
//! entry point, so a timer firing while a sweep is already draining
//! the queue simply collapses into a no-op.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use courier_core::{
    Clock, CourierError, Dispatcher, MessageStatus, Notifier, QueueEvent, QueuedMessage,
};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::backoff::RetryPolicy;
use crate::report::ErrorLog;
use crate::state::QueueState;

/// What a drain cycle accomplished, deciding whether to go around again.
enum CycleOutcome {
    /// Nothing eligible; the queue may still hold locked entries.
    Idle,
    /// One message was attempted and resolved.
    Processed,
}

pub struct QueueProcessor {
    state: Arc<QueueState>,
    dispatcher: Arc<dyn Dispatcher>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    error_log: Arc<ErrorLog>,
    policy: RetryPolicy,
    busy: AtomicBool,
    timers: Mutex<HashMap<String, AbortHandle>>,
    self_ref: Weak<Self>,
}

impl QueueProcessor {
    pub fn new(
        state: Arc<QueueState>,
        dispatcher: Arc<dyn Dispatcher>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        error_log: Arc<ErrorLog>,
        policy: RetryPolicy,
    ) -> Arc<Self> {
        // Timer tasks need a handle back to the processor without
        // keeping it alive forever.
        Arc::new_cyclic(|self_ref| Self {
            state,
            dispatcher,
            notifier,
            clock,
            error_log,
            policy,
            busy: AtomicBool::new(false),
            timers: Mutex::new(HashMap::new()),
            self_ref: self_ref.clone(),
        })
    }

    /// Drains eligible messages one at a time until the queue is empty
    /// or everything left is locked out. Returns immediately when
    /// another trigger is already draining.
    pub async fn process(&self) {
        loop {
            if self
                .busy
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
            {
                return;
            }
            let outcome = self.run_cycle().await;
            self.busy.store(false, Ordering::Release);

            match outcome {
                CycleOutcome::Processed if !self.state.is_empty().await => continue,
                _ => return,
            }
        }
    }

    async fn run_cycle(&self) -> CycleOutcome {
        let Some(message) = self.state.first_eligible().await else {
            return CycleOutcome::Idle;
        };

        // A sweep can reach a message before its retry timer fires; the
        // stale timer must not double-trigger later.
        self.cancel_timer(&message.id).await;

        let lock_until = self.clock.now() + self.policy.lock_timeout();
        let claimed = self
            .state
            .update(&message.id, |entry| {
                entry.status = MessageStatus::Sending;
                entry.lock_until = Some(lock_until);
            })
            .await;
        if !claimed {
            // Removed between selection and claim; scan again.
            return CycleOutcome::Processed;
        }

        let mut in_flight = message;
        in_flight.status = MessageStatus::Sending;
        in_flight.lock_until = Some(lock_until);

        debug!(id = %in_flight.id, retry_count = in_flight.retry_count, "dispatching message");
        match self.dispatcher.send(&in_flight).await {
            Ok(()) => self.resolve_success(&in_flight).await,
            Err(err) => self.resolve_failure(&in_flight, &err).await,
        }
        CycleOutcome::Processed
    }

    async fn resolve_success(&self, message: &QueuedMessage) {
        // Removal may be a no-op if the queue was cleared mid-flight;
        // the delivery still happened, so the event still goes out.
        self.state.remove(&message.id).await;
        info!(id = %message.id, "message delivered");
        self.notifier
            .publish(QueueEvent::MessageSent {
                id: message.id.clone(),
            })
            .await;
    }

    async fn resolve_failure(&self, message: &QueuedMessage, err: &CourierError) {
        let error_text = err.attempt_message();
        self.error_log
            .record(
                format!("failed to send message: {error_text}"),
                Some(message.id.clone()),
            )
            .await;

        let attempts = message.retry_count + 1;
        if attempts >= self.policy.max_retries {
            let updated = self
                .state
                .update(&message.id, |entry| {
                    entry.status = MessageStatus::Failed;
                    entry.error = Some(error_text.clone());
                    entry.lock_until = None;
                })
                .await;
            if !updated {
                return;
            }
            warn!(id = %message.id, attempts, error = %error_text, "message failed permanently");
            self.notifier
                .publish(QueueEvent::MessageFailed {
                    id: message.id.clone(),
                    error: error_text,
                })
                .await;
            self.state.remove(&message.id).await;
        } else {
            let delay_ms = self.policy.backoff.delay_ms(message.retry_count);
            let next_retry_at = self.clock.now()
                + chrono::Duration::milliseconds(i64::try_from(delay_ms).unwrap_or(i64::MAX));
            let updated = self
                .state
                .update(&message.id, |entry| {
                    entry.retry_count = attempts;
                    entry.status = MessageStatus::Pending;
                    entry.error = Some(error_text.clone());
                    entry.lock_until = Some(next_retry_at);
                })
                .await;
            if !updated {
                return;
            }
            warn!(
                id = %message.id,
                retry_count = attempts,
                delay_ms,
                error = %error_text,
                "delivery failed, retry scheduled"
            );
            self.notifier
                .publish(QueueEvent::MessageRetry {
                    id: message.id.clone(),
                    retry_count: attempts,
                    next_retry_at,
                })
                .await;
            self.arm_timer(message.id.clone(), delay_ms).await;
        }
    }

    /// Schedules a one-shot re-trigger for `id`, replacing any timer
    /// already armed for it.
    async fn arm_timer(&self, id: String, delay_ms: u64) {
        let handle = self.self_ref.clone();
        let timer_id = id.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            let Some(processor) = handle.upgrade() else {
                return;
            };
            processor.timers.lock().await.remove(&timer_id);
            processor.process_boxed().await;
        });

        let mut timers = self.timers.lock().await;
        if let Some(stale) = timers.insert(id, task.abort_handle()) {
            stale.abort();
        }
    }

    /// [`Self::process`] behind a boxed, type-erased future. Timer tasks
    /// must re-enter through this: awaiting `process()` directly inside
    /// the spawned task makes the task's `Send` proof depend on its own
    /// opaque future type, which the compiler rejects as a cycle.
    fn process_boxed(self: Arc<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move { self.process().await })
    }

    pub async fn cancel_timer(&self, id: &str) {
        if let Some(timer) = self.timers.lock().await.remove(id) {
            timer.abort();
        }
    }

    pub async fn cancel_all_timers(&self) {
        let mut timers = self.timers.lock().await;
        for (_, timer) in timers.drain() {
            timer.abort();
        }
    }

    #[cfg(test)]
    pub(crate) async fn timer_count(&self) -> usize {
        self.timers.lock().await.len()
    }
}
