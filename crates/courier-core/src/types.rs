// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the courier workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery state of a queued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Waiting to be picked up, possibly gated by `lock_until`.
    Pending,
    /// Handed to the dispatcher. `lock_until` bounds the attempt so a
    /// crashed or wedged attempt becomes eligible again.
    Sending,
    /// Retry ceiling reached. Terminal.
    Failed,
    /// Delivered. Never persisted: removal from the queue is the durable
    /// success signal.
    Sent,
}

/// A unit of outbound work tracked by the delivery queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMessage {
    /// Opaque unique identifier, stable for the message lifetime.
    pub id: String,
    /// Payload to deliver. The queue never interprets it.
    pub content: String,
    /// Correlation key for the receiving endpoint.
    pub conversation_id: String,
    /// Optional secondary correlation key, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    /// Enqueue time.
    pub timestamp: DateTime<Utc>,
    /// Failed delivery attempts so far.
    pub retry_count: u32,
    pub status: MessageStatus,
    /// Last failure reason, verbatim from the dispatcher. Cleared on
    /// manual retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Absolute time before which this message must not be picked up.
    /// Doubles as the in-flight marker and the backoff gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_until: Option<DateTime<Utc>>,
}

impl QueuedMessage {
    /// Whether the message may be picked up for an attempt at `now`.
    ///
    /// `pending` is eligible once any lock has elapsed. `sending` with an
    /// elapsed lock counts as an abandoned attempt and is eligible again;
    /// duplicate delivery is accepted over a stuck message.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        let lock_elapsed = match self.lock_until {
            Some(until) => until <= now,
            None => true,
        };
        match self.status {
            MessageStatus::Pending => lock_elapsed,
            MessageStatus::Sending => lock_elapsed,
            MessageStatus::Failed | MessageStatus::Sent => false,
        }
    }
}

/// Lifecycle events broadcast on the notification channel.
///
/// Serialized as a tagged record (`type` discriminant plus `payload`) so
/// subscribers can switch on the event kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueEvent {
    /// The persisted snapshot changed. Carries the full queue.
    QueueUpdated { queue: Vec<QueuedMessage> },
    /// A message was delivered and removed.
    MessageSent { id: String },
    /// A message exhausted its retries.
    MessageFailed { id: String, error: String },
    /// A failed attempt was rescheduled.
    MessageRetry {
        id: String,
        retry_count: u32,
        next_retry_at: DateTime<Utc>,
    },
}

/// A diagnostic entry in the bounded error report log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Human-readable failure description.
    pub message: String,
    /// Where the failure happened, e.g. the message id it concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
}
