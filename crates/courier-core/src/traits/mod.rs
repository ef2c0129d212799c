// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits for the delivery queue.
//!
//! The queue core depends only on these seams. Storage, dispatch,
//! notification, and time backends are substituted per environment.

pub mod clock;
pub mod dispatch;
pub mod notify;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use dispatch::Dispatcher;
pub use notify::Notifier;
pub use store::KvStore;
