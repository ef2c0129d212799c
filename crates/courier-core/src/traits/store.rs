// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent key-value storage trait.

use async_trait::async_trait;

use crate::error::CourierError;

/// Asynchronous key-value store that survives process restarts.
///
/// The queue persists its full serialized snapshot under one fixed key
/// after every mutation, so the contract is deliberately small: point
/// reads and whole-value writes. Implementations must be shareable
/// across tasks.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, CourierError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), CourierError>;
}
