// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for courier integration tests.
//!
//! Provides mock collaborators for fast, deterministic, CI-runnable tests
//! without external services.
//!
//! # Components
//!
//! - [`MockDispatcher`] - Mock delivery endpoint with scripted outcomes
//! - [`RecordingNotifier`] - Notifier that captures published events
//! - [`ManualClock`] - Clock advanced explicitly by the test
//! - [`FlakyStore`] - Store wrapper that injects failures on demand

pub mod flaky_store;
pub mod manual_clock;
pub mod mock_dispatcher;
pub mod recording_notifier;

pub use flaky_store::FlakyStore;
pub use manual_clock::ManualClock;
pub use mock_dispatcher::MockDispatcher;
pub use recording_notifier::RecordingNotifier;
