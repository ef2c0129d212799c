// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed implementation of the [`KvStore`] trait.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;

use courier_core::{CourierError, KvStore};

/// Schema and pragmas applied on every open.
///
/// WAL keeps readers unblocked during the frequent snapshot writes;
/// `busy_timeout` covers the rare case of an external reader holding
/// the file.
const INIT_SQL: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA busy_timeout = 5000;
    CREATE TABLE IF NOT EXISTS kv_store (
        key        TEXT PRIMARY KEY,
        value      TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );
";

/// Durable key-value store backed by a single SQLite database file.
///
/// Wraps one `tokio_rusqlite::Connection`; all calls are serialized on its
/// background thread, so a `SqliteStore` clone handed to other tasks is the
/// same single writer.
#[derive(Clone)]
pub struct SqliteStore {
    conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
    /// Open (creating if necessary) the database at `path` and apply the
    /// schema. The parent directory is created if missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CourierError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(CourierError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|err| map_store_err(err.into()))?;

        conn.call(|conn| {
            conn.execute_batch(INIT_SQL)?;
            Ok(())
        })
        .await
        .map_err(map_store_err)?;

        debug!(path = %path.display(), "sqlite store opened");
        Ok(Self { conn })
    }

    /// Checkpoint the WAL into the main database file.
    ///
    /// Called on shutdown so a subsequent process sees the latest snapshot
    /// even if it opens the file without WAL support.
    pub async fn close(&self) -> Result<(), CourierError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_store_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CourierError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
                let mut rows = stmt.query(params![key])?;
                match rows.next()? {
                    Some(row) => {
                        let value: String = row.get(0)?;
                        Ok(Some(value))
                    }
                    None => Ok(None),
                }
            })
            .await
            .map_err(map_store_err)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CourierError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO kv_store (key, value, updated_at)
                     VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = excluded.updated_at",
                    params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(map_store_err)
    }
}

/// Map a `tokio_rusqlite::Error` into the workspace error type.
fn map_store_err(err: tokio_rusqlite::Error) -> CourierError {
    CourierError::Storage {
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open_test.db");
        let store = SqliteStore::open(&db_path).await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/dirs/test.db");
        let store = SqliteStore::open(&db_path).await.unwrap();
        assert!(db_path.exists());
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_key_returns_none() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("missing.db")).await.unwrap();
        let value = store.get("message_queue").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("roundtrip.db")).await.unwrap();

        store
            .set("message_queue", r#"[{"id":"m-1"}]"#.to_string())
            .await
            .unwrap();
        let value = store.get("message_queue").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"[{"id":"m-1"}]"#));
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("overwrite.db")).await.unwrap();

        store.set("message_queue", "[]".to_string()).await.unwrap();
        store
            .set("message_queue", r#"[{"id":"m-2"}]"#.to_string())
            .await
            .unwrap();
        let value = store.get("message_queue").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"[{"id":"m-2"}]"#));
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");

        {
            let store = SqliteStore::open(&db_path).await.unwrap();
            store
                .set("message_queue", r#"[{"id":"m-3"}]"#.to_string())
                .await
                .unwrap();
            store.close().await.unwrap();
        }

        let store = SqliteStore::open(&db_path).await.unwrap();
        let value = store.get("message_queue").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"[{"id":"m-3"}]"#));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("keys.db")).await.unwrap();

        store.set("message_queue", "[]".to_string()).await.unwrap();
        store.set("error_log", r#"[{"message":"boom"}]"#.to_string()).await.unwrap();

        assert_eq!(store.get("message_queue").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(
            store.get("error_log").await.unwrap().as_deref(),
            Some(r#"[{"message":"boom"}]"#)
        );
    }

    #[tokio::test]
    async fn concurrent_writers_no_sqlite_busy() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("concurrent.db")).await.unwrap();

        // Spawn 10 concurrent tasks all writing through the same store.
        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set(&format!("key-{i}"), format!("value-{i}")).await
            }));
        }

        // All should complete without SQLITE_BUSY.
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_ok(), "concurrent write failed: {result:?}");
        }

        for i in 0..10 {
            let value = store.get(&format!("key-{i}")).await.unwrap();
            assert_eq!(value, Some(format!("value-{i}")));
        }
    }
}
