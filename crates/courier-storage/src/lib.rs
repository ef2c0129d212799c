// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage backends for the courier delivery queue.
//!
//! The queue persists its state through the small [`KvStore`] trait from
//! `courier-core`. This crate provides the two implementations used in
//! practice: [`SqliteStore`] for durable on-disk state and [`MemoryStore`]
//! for tests and ephemeral runs.
//!
//! All SQLite writes are serialized through `tokio-rusqlite`'s single
//! background thread, which eliminates SQLITE_BUSY errors under concurrent
//! access. Do NOT create additional connections to the same database file
//! for writes.

pub mod memory;
pub mod sqlite;

pub use courier_core::KvStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
