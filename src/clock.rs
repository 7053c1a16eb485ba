//! Elapsed-time sources.
//!
//! `ProcessClock` measures monotonic time since it was created at startup.
//! `ManualClock` is advanced explicitly, so readiness can be exercised at any
//! elapsed time without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Supplies the time elapsed since process start.
pub trait Clock: Send + Sync {
    fn elapsed(&self) -> Duration;
}

/// Monotonic clock anchored at process start.
#[derive(Debug, Clone, Copy)]
pub struct ProcessClock {
    start: Instant,
    started_at: DateTime<Utc>,
}

impl ProcessClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Wall-clock time the process started, for display only.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Clock for ProcessClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Clock whose elapsed time only changes when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed_nanos: AtomicU64::new(saturating_nanos(elapsed)),
        }
    }

    pub fn set(&self, elapsed: Duration) {
        self.elapsed_nanos
            .store(saturating_nanos(elapsed), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let by = saturating_nanos(by);
        // fetch_update never fails with a closure that always returns Some
        let _ = self
            .elapsed_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(by))
            });
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_clock_is_monotonic() {
        let clock = ProcessClock::start();
        let first = clock.elapsed();
        let second = clock.elapsed();
        assert!(second >= first);
        assert!(clock.started_at() <= Utc::now());
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::default();
        assert_eq!(clock.elapsed(), Duration::ZERO);

        clock.advance(Duration::from_millis(1500));
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));

        clock.set(Duration::from_secs(5));
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn test_manual_clock_saturates_large_durations() {
        let clock = ManualClock::new(Duration::MAX);
        assert_eq!(clock.elapsed(), Duration::from_nanos(u64::MAX));

        clock.set(Duration::from_secs(1));
        clock.advance(Duration::MAX);
        assert_eq!(clock.elapsed(), Duration::from_nanos(u64::MAX));
    }
}
