//! # Fibonacci Backoff
//!
//! Progressive retry delay for bindings whose reconciliation keeps failing.
//! Grows more slowly than exponential backoff, so a flapping DigitalOcean API
//! or an unreachable apiserver is retried often at first without hammering
//! either side later on.
//!
//! Sequence with the default settings: 1m, 1m, 2m, 3m, 5m (max).

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each backoff is the sum of the previous two, starting from `min` twice and
/// capped at `max`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Previous backoff value
    prev: Duration,
    /// Current backoff value
    current: Duration,
    /// Maximum backoff value
    max: Duration,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff
    ///
    /// # Arguments
    ///
    /// * `min` - First two values of the sequence. Clamped to `max`.
    /// * `max` - Caps the sequence
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let min = min.min(max);
        Self {
            prev: Duration::ZERO,
            current: min,
            max,
        }
    }

    /// Get the next backoff duration and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;

        let next = self.prev.saturating_add(self.current);
        self.prev = self.current;
        self.current = next.min(self.max);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(MINUTE, 5 * MINUTE);

        assert_eq!(backoff.next_backoff(), MINUTE);
        assert_eq!(backoff.next_backoff(), MINUTE);
        assert_eq!(backoff.next_backoff(), 2 * MINUTE);
        assert_eq!(backoff.next_backoff(), 3 * MINUTE);
        assert_eq!(backoff.next_backoff(), 5 * MINUTE);
        // 8m is capped
        assert_eq!(backoff.next_backoff(), 5 * MINUTE);
        assert_eq!(backoff.next_backoff(), 5 * MINUTE);
    }

    #[test]
    fn test_min_is_clamped_to_max() {
        let mut backoff = FibonacciBackoff::new(MINUTE, Duration::from_secs(10));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
    }
}
