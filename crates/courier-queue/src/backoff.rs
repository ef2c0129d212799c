// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry timing policy.
//!
//! Delays grow geometrically with the number of completed attempts and
//! are capped so a long-failing message keeps retrying at a steady
//! ceiling instead of drifting out indefinitely.

use std::time::Duration;

/// Exponential backoff schedule: `base * growth^attempts`, capped at
/// `max_delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay_ms: u64,
    pub growth_factor: u64,
    pub max_delay_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            growth_factor: 2,
            max_delay_ms: 60_000,
        }
    }
}

impl BackoffPolicy {
    /// Delay before the next attempt, given how many attempts have
    /// already completed. Overflow saturates into the cap.
    pub fn delay_ms(&self, attempts: u32) -> u64 {
        let factor = self.growth_factor.checked_pow(attempts).unwrap_or(u64::MAX);
        self.base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms)
    }

    pub fn delay(&self, attempts: u32) -> Duration {
        Duration::from_millis(self.delay_ms(attempts))
    }
}

/// Everything the processor needs to decide when to give up on a
/// message and how long to hold its in-flight lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub backoff: BackoffPolicy,
    /// Attempts after which a message is marked failed and dropped.
    pub max_retries: u32,
    /// How long a dispatch attempt may hold a message before other
    /// triggers treat it as abandoned.
    pub lock_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            max_retries: 3,
            lock_timeout_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    pub fn lock_timeout(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.lock_timeout_ms).unwrap_or(i64::MAX))
    }
}
