// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clock advanced explicitly by the test.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};

use courier_core::Clock;

/// A [`Clock`] whose time only moves when the test says so.
///
/// Lets tests drive lock expiry and backoff eligibility without real
/// sleeps. Stored as epoch milliseconds so clones share the same time
/// and advancing is lock-free.
#[derive(Clone)]
pub struct ManualClock {
    now_ms: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(start.timestamp_millis())),
        }
    }

    /// Create a clock frozen at a fixed, readable reference time.
    pub fn fixed() -> Self {
        Self::at(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap())
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now_ms
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }

    /// Jump the clock to an absolute time.
    pub fn set(&self, to: DateTime<Utc>) {
        self.now_ms.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_ms.load(Ordering::SeqCst))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_frozen_until_advanced() {
        let clock = ManualClock::fixed();
        let before = clock.now();
        let after = clock.now();
        assert_eq!(before, after);
    }

    #[test]
    fn advance_moves_time_forward() {
        let clock = ManualClock::fixed();
        let start = clock.now();
        clock.advance(Duration::milliseconds(1500));
        assert_eq!(clock.now() - start, Duration::milliseconds(1500));
    }

    #[test]
    fn clones_share_the_same_time() {
        let clock = ManualClock::fixed();
        let other = clock.clone();
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), other.now());
    }

    #[test]
    fn set_jumps_to_absolute_time() {
        let clock = ManualClock::fixed();
        let target = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}
