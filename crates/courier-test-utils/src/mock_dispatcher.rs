// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock dispatcher for deterministic testing.
//!
//! `MockDispatcher` implements `Dispatcher` with pre-configured outcomes,
//! enabling fast, CI-runnable tests without a live endpoint.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use courier_core::{CourierError, Dispatcher, QueuedMessage};

/// A mock delivery endpoint with scripted outcomes.
///
/// Outcomes are popped from a FIFO queue: `Ok(())` delivers, `Err(text)`
/// fails the attempt with that text. When the queue is empty, delivery
/// succeeds. Every attempted message is captured for assertions.
pub struct MockDispatcher {
    outcomes: Arc<Mutex<VecDeque<Result<(), String>>>>,
    sent: Arc<Mutex<Vec<QueuedMessage>>>,
}

impl MockDispatcher {
    /// Create a new mock dispatcher that always succeeds.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock dispatcher pre-loaded with the given outcomes.
    pub fn with_outcomes(outcomes: Vec<Result<(), String>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shorthand for a dispatcher whose next `n` attempts fail with `text`.
    pub fn failing_times(n: usize, text: &str) -> Self {
        Self::with_outcomes(vec![Err(text.to_string()); n])
    }

    /// Add an outcome to the end of the queue.
    pub async fn add_outcome(&self, outcome: Result<(), String>) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// All messages passed to `send()`, in attempt order.
    pub async fn sent_messages(&self) -> Vec<QueuedMessage> {
        self.sent.lock().await.clone()
    }

    /// Number of delivery attempts made so far.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear the captured attempts.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Pop the next outcome, or succeed by default.
    async fn next_outcome(&self) -> Result<(), String> {
        self.outcomes.lock().await.pop_front().unwrap_or(Ok(()))
    }
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    async fn send(&self, message: &QueuedMessage) -> Result<(), CourierError> {
        self.sent.lock().await.push(message.clone());
        self.next_outcome()
            .await
            .map_err(CourierError::dispatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use courier_core::MessageStatus;

    fn make_message(id: &str) -> QueuedMessage {
        QueuedMessage {
            id: id.to_string(),
            content: "hello".to_string(),
            conversation_id: "c-1".to_string(),
            assistant_id: None,
            timestamp: Utc::now(),
            retry_count: 0,
            status: MessageStatus::Pending,
            error: None,
            lock_until: None,
        }
    }

    #[tokio::test]
    async fn default_outcome_is_success() {
        let dispatcher = MockDispatcher::new();
        assert!(dispatcher.send(&make_message("m-1")).await.is_ok());
        assert_eq!(dispatcher.sent_count().await, 1);
    }

    #[tokio::test]
    async fn scripted_outcomes_returned_in_order() {
        let dispatcher = MockDispatcher::with_outcomes(vec![
            Err("first failure".to_string()),
            Ok(()),
        ]);

        let err = dispatcher.send(&make_message("m-1")).await.unwrap_err();
        assert_eq!(err.attempt_message(), "first failure");
        assert!(dispatcher.send(&make_message("m-1")).await.is_ok());
        // Queue exhausted, falls back to success
        assert!(dispatcher.send(&make_message("m-2")).await.is_ok());
    }

    #[tokio::test]
    async fn failing_times_scripts_repeated_failures() {
        let dispatcher = MockDispatcher::failing_times(2, "boom");
        assert!(dispatcher.send(&make_message("m-1")).await.is_err());
        assert!(dispatcher.send(&make_message("m-1")).await.is_err());
        assert!(dispatcher.send(&make_message("m-1")).await.is_ok());
    }

    #[tokio::test]
    async fn attempts_are_captured() {
        let dispatcher = MockDispatcher::new();
        dispatcher.send(&make_message("m-1")).await.unwrap();
        dispatcher.send(&make_message("m-2")).await.unwrap();

        let sent = dispatcher.sent_messages().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].id, "m-1");
        assert_eq!(sent[1].id, "m-2");

        dispatcher.clear_sent().await;
        assert_eq!(dispatcher.sent_count().await, 0);
    }
}
