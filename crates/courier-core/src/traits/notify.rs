// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification trait for queue lifecycle events.

use async_trait::async_trait;

use crate::types::QueueEvent;

/// Fire-and-forget publisher for queue lifecycle events.
///
/// Publication must never fail into the queue: implementations absorb
/// delivery problems (no subscriber, closed channel) internally, which
/// is why `publish` returns nothing.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: QueueEvent);
}
