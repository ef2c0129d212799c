// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store wrapper that injects failures on demand.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use courier_core::{CourierError, KvStore};
use courier_storage::MemoryStore;

/// A [`KvStore`] over [`MemoryStore`] that fails the next N reads or
/// writes when told to.
///
/// Used to verify that snapshot persistence failures are absorbed by the
/// queue instead of breaking delivery.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_sets: Arc<AtomicUsize>,
    failing_gets: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls to `set` fail.
    pub fn fail_next_sets(&self, n: usize) {
        self.failing_sets.fetch_add(n, Ordering::SeqCst);
    }

    /// Make the next `n` calls to `get` fail.
    pub fn fail_next_gets(&self, n: usize) {
        self.failing_gets.fetch_add(n, Ordering::SeqCst);
    }

    /// Read a value through the inner store, bypassing failure injection.
    pub async fn raw_get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.ok().flatten()
    }

    /// Decrement `counter` if positive; true means this call should fail.
    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CourierError> {
        if Self::take(&self.failing_gets) {
            return Err(CourierError::storage(std::io::Error::other(
                "injected get failure",
            )));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CourierError> {
        if Self::take(&self.failing_sets) {
            return Err(CourierError::storage(std::io::Error::other(
                "injected set failure",
            )));
        }
        self.inner.set(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_by_default() {
        let store = FlakyStore::new();
        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn fails_exactly_the_requested_number_of_sets() {
        let store = FlakyStore::new();
        store.fail_next_sets(2);

        assert!(store.set("k", "a".to_string()).await.is_err());
        assert!(store.set("k", "b".to_string()).await.is_err());
        assert!(store.set("k", "c".to_string()).await.is_ok());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn failed_sets_leave_previous_value_intact() {
        let store = FlakyStore::new();
        store.set("k", "original".to_string()).await.unwrap();

        store.fail_next_sets(1);
        assert!(store.set("k", "lost".to_string()).await.is_err());
        assert_eq!(store.raw_get("k").await.as_deref(), Some("original"));
    }

    #[tokio::test]
    async fn fails_gets_on_demand() {
        let store = FlakyStore::new();
        store.set("k", "v".to_string()).await.unwrap();

        store.fail_next_gets(1);
        assert!(store.get("k").await.is_err());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
