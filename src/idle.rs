//! Idle detection gating the lowest-priority queue
//!
//! The host UI forwards pointer/keyboard/scroll events via
//! [`IdleDetector::record_interaction`]; after a fixed quiet period with no
//! events the detector reports idle, which is the sole gate for the Idle queue.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default quiet period before the user counts as idle.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub struct IdleDetector {
    last_interaction: Mutex<Instant>,
    quiet_period: Duration,
}

impl Default for IdleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl IdleDetector {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            last_interaction: Mutex::new(Instant::now()),
            quiet_period,
        }
    }

    /// Record a user interaction; immediately flips back to non-idle and
    /// restarts the quiet timer.
    pub fn record_interaction(&self) {
        *self.last_interaction.lock() = Instant::now();
    }

    /// True once the quiet period has elapsed without interactions.
    pub fn is_idle(&self) -> bool {
        self.last_interaction.lock().elapsed() >= self.quiet_period
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_idle_right_after_interaction() {
        let detector = IdleDetector::new(Duration::from_secs(60));
        detector.record_interaction();
        assert!(!detector.is_idle());
    }

    #[test]
    fn test_idle_after_quiet_period() {
        let detector = IdleDetector::new(Duration::ZERO);
        assert!(detector.is_idle());

        // Any event flips back for a non-zero period
        let detector = IdleDetector::new(Duration::from_secs(60));
        assert!(!detector.is_idle());
    }
}
