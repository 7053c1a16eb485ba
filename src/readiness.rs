//! Readiness gate.
//!
//! An instance becomes ready once the time since start strictly exceeds the
//! configured delay. The transition is one-way: elapsed time never decreases,
//! so a ready instance never goes back to not-ready.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::config::ReadinessConfig;

/// Answers whether this instance should receive traffic.
#[derive(Clone)]
pub struct ReadinessGate {
    clock: Arc<dyn Clock>,
    delay: Duration,
}

impl ReadinessGate {
    pub fn new(clock: Arc<dyn Clock>, config: ReadinessConfig) -> Self {
        Self {
            clock,
            delay: config.delay(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Time since process start, as seen by the gate's clock.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// True once elapsed time is strictly greater than the delay.
    pub fn is_ready(&self) -> bool {
        let elapsed = self.clock.elapsed();
        let ready = elapsed > self.delay;
        tracing::debug!(
            elapsed_secs = elapsed.as_secs_f64(),
            delay_secs = self.delay.as_secs(),
            ready,
            "Readiness check"
        );
        ready
    }
}

impl std::fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("delay", &self.delay)
            .field("elapsed", &self.clock.elapsed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn gate(delay_secs: u64, elapsed: Duration) -> (Arc<ManualClock>, ReadinessGate) {
        let clock = Arc::new(ManualClock::new(elapsed));
        let gate = ReadinessGate::new(clock.clone(), ReadinessConfig::new(delay_secs));
        (clock, gate)
    }

    #[test]
    fn test_not_ready_at_exact_boundary() {
        let (_, gate) = gate(2, Duration::from_secs(2));
        assert!(!gate.is_ready());
    }

    #[test]
    fn test_ready_just_past_boundary() {
        let (_, gate) = gate(2, Duration::from_secs(2) + Duration::from_nanos(1));
        assert!(gate.is_ready());
    }

    #[test]
    fn test_not_ready_at_start_with_delay() {
        let (_, gate) = gate(5, Duration::ZERO);
        assert!(!gate.is_ready());
    }

    #[test]
    fn test_zero_delay_ready_immediately_after_start() {
        let (_, gate) = gate(0, Duration::from_millis(1));
        assert!(gate.is_ready());
    }

    #[test]
    fn test_transition_is_one_way() {
        let (clock, gate) = gate(2, Duration::from_secs(1));
        assert!(!gate.is_ready());

        clock.advance(Duration::from_secs(2));
        assert!(gate.is_ready());

        clock.advance(Duration::from_secs(60));
        assert!(gate.is_ready());
    }

    #[test]
    fn test_elapsed_before_and_after_delay() {
        let (clock, gate) = gate(2, Duration::from_secs(1));
        assert!(!gate.is_ready());
        clock.set(Duration::from_secs(3));
        assert!(gate.is_ready());
        assert_eq!(gate.elapsed(), Duration::from_secs(3));
        assert_eq!(gate.delay(), Duration::from_secs(2));
    }
}
