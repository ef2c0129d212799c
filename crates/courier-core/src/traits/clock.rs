// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clock seam so time-gated logic stays testable.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
///
/// Production code uses [`SystemClock`]; tests substitute a manual clock
/// to drive lock expiry without real sleeps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
