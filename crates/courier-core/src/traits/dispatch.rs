// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery trait for the actual network send.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::types::QueuedMessage;

/// Performs the network delivery of a single queued message.
///
/// There is no partial success: `Ok` means delivered, and any `Err`
/// counts as one failed attempt with its text surfaced on the message.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send(&self, message: &QueuedMessage) -> Result<(), CourierError>;
}
