// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the courier delivery queue.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the courier workspace. Storage, dispatch,
//! and notification backends implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CourierError;
pub use types::{ErrorReport, MessageStatus, QueueEvent, QueuedMessage};

// Re-export all collaborator traits at crate root.
pub use traits::{Clock, Dispatcher, KvStore, Notifier, SystemClock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_error_has_all_variants() {
        // Verify all 5 error variants exist and can be constructed.
        let _config = CourierError::Config("test".into());
        let _storage = CourierError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _dispatch = CourierError::Dispatch {
            message: "test".into(),
            source: None,
        };
        let _not_found = CourierError::NotFound { id: "test".into() };
        let _internal = CourierError::Internal("test".into());
    }

    #[test]
    fn message_status_has_four_variants() {
        let variants = [
            MessageStatus::Pending,
            MessageStatus::Sending,
            MessageStatus::Failed,
            MessageStatus::Sent,
        ];
        assert_eq!(variants.len(), 4, "MessageStatus must have exactly 4 variants");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // This test verifies that all collaborator trait modules compile
        // and are accessible through the public API. If any module is
        // missing or has a compile error, this test won't compile.
        fn _assert_store<T: KvStore>() {}
        fn _assert_dispatcher<T: Dispatcher>() {}
        fn _assert_notifier<T: Notifier>() {}
        fn _assert_clock<T: Clock>() {}
        let _clock = SystemClock;
    }
}
