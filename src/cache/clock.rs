//! Time sources for cache expiry

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// Source of "now" for expiry decisions, in milliseconds.
///
/// Only differences between readings matter, so implementations are free to
/// pick any origin.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Monotonic clock backed by [`Instant`].
///
/// Unaffected by wall-clock adjustments (NTP steps, manual changes), so
/// entries never expire early or late because the system time moved.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

/// Manually advanced clock, for deterministic expiry tests and replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    /// Move time forward by `millis`, saturating at the ends of `i64`
    pub fn advance(&self, millis: i64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(millis))
            });
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);

        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);

        clock.set(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_manual_clock_advance_saturates() {
        let clock = ManualClock::new(i64::MAX - 10);
        clock.advance(100);
        assert_eq!(clock.now_millis(), i64::MAX);

        clock.set(i64::MIN + 10);
        clock.advance(-100);
        assert_eq!(clock.now_millis(), i64::MIN);
    }

    #[test]
    fn test_monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
        assert!(a >= 0);
    }
}
