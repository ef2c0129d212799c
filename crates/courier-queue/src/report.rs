// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent log of operational failures.
//!
//! Every failed dispatch attempt and every storage mishap lands here so
//! an operator can inspect what went wrong after the fact. The log is a
//! bounded list under a fixed key, newest entry first. Recording never
//! fails: a log that cannot be written must not take the queue down
//! with it.

use std::sync::Arc;

use courier_core::{Clock, CourierError, ErrorReport, KvStore};
use tracing::warn;

/// Storage key holding the serialized report list.
pub const ERROR_LOG_KEY: &str = "error_log";

/// Reports kept before the oldest are dropped.
pub const DEFAULT_ERROR_LOG_CAPACITY: usize = 100;

pub struct ErrorLog {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    capacity: usize,
}

impl ErrorLog {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, capacity: usize) -> Self {
        Self {
            store,
            clock,
            capacity,
        }
    }

    /// Prepends a report, trimming the list to capacity. Failures to
    /// read or write the underlying store are logged and swallowed.
    pub async fn record(&self, message: impl Into<String>, context: Option<String>) {
        let report = ErrorReport {
            message: message.into(),
            context,
            timestamp: self.clock.now(),
        };

        let mut reports = self.stored_reports().await;
        reports.insert(0, report);
        reports.truncate(self.capacity);

        let json = match serde_json::to_string(&reports) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize error log");
                return;
            }
        };
        if let Err(err) = self.store.set(ERROR_LOG_KEY, json).await {
            warn!(error = %err, "failed to persist error log");
        }
    }

    /// Stored reports, newest first.
    pub async fn recent(&self) -> Result<Vec<ErrorReport>, CourierError> {
        let Some(json) = self.store.get(ERROR_LOG_KEY).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&json).map_err(CourierError::storage)
    }

    pub async fn clear(&self) -> Result<(), CourierError> {
        self.store.set(ERROR_LOG_KEY, "[]".to_string()).await
    }

    /// Current list for read-modify-write. Unreadable or corrupt state
    /// degrades to an empty list rather than blocking the write.
    async fn stored_reports(&self) -> Vec<ErrorReport> {
        match self.store.get(ERROR_LOG_KEY).await {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed to read error log, starting a fresh list");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_storage::MemoryStore;
    use courier_test_utils::{FlakyStore, ManualClock};

    fn log_over(store: impl KvStore + 'static, capacity: usize) -> (ErrorLog, ManualClock) {
        let clock = ManualClock::fixed();
        let log = ErrorLog::new(Arc::new(store), Arc::new(clock.clone()), capacity);
        (log, clock)
    }

    #[tokio::test]
    async fn recent_on_empty_store_is_empty() {
        let (log, _clock) = log_over(MemoryStore::new(), 10);
        assert!(log.recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_are_kept_newest_first() {
        let (log, clock) = log_over(MemoryStore::new(), 10);

        log.record("first failure", None).await;
        clock.advance(chrono::Duration::seconds(1));
        log.record("second failure", Some("msg-1".to_string())).await;

        let reports = log.recent().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].message, "second failure");
        assert_eq!(reports[0].context.as_deref(), Some("msg-1"));
        assert_eq!(reports[1].message, "first failure");
        assert!(reports[0].timestamp > reports[1].timestamp);
    }

    #[tokio::test]
    async fn capacity_drops_the_oldest_entries() {
        let (log, _clock) = log_over(MemoryStore::new(), 3);

        for n in 0..5 {
            log.record(format!("failure {n}"), None).await;
        }

        let reports = log.recent().await.unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].message, "failure 4");
        assert_eq!(reports[2].message, "failure 2");
    }

    #[tokio::test]
    async fn clear_empties_the_log() {
        let (log, _clock) = log_over(MemoryStore::new(), 10);
        log.record("failure", None).await;

        log.clear().await.unwrap();

        assert!(log.recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_survives_a_failing_store() {
        let store = FlakyStore::new();
        store.fail_next_sets(1);
        let (log, _clock) = log_over(store.clone(), 10);

        // Must not panic or error out.
        log.record("lost to the void", None).await;

        assert_eq!(store.raw_get(ERROR_LOG_KEY).await, None);

        // The next record goes through normally.
        log.record("kept", None).await;
        let reports = log.recent().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "kept");
    }

    #[tokio::test]
    async fn corrupt_log_degrades_to_fresh_list_on_record() {
        let store = MemoryStore::new();
        store.set(ERROR_LOG_KEY, "not json".to_string()).await.unwrap();
        let clock = ManualClock::fixed();
        let log = ErrorLog::new(Arc::new(store), Arc::new(clock), 10);

        log.record("after corruption", None).await;

        let reports = log.recent().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "after corruption");
    }
}
