//! Reconnect policy behind the session's recovery path.
//!
//! The session asks the policy whether (and after how long) to open a
//! fresh channel after a detected drop. Swapping the policy never touches
//! the channel lifecycle logic.

use std::time::Duration;

/// Decides how reconnect attempts are scheduled after a channel drop.
///
/// `attempt` is 1-based: the first attempt after a drop is attempt 1.
/// The counter resets every time a channel opens successfully.
pub trait RetryPolicy: std::fmt::Debug + Send + Sync {
    /// Whether to make the given attempt at all.
    fn should_attempt(&self, attempt: u32) -> bool;

    /// Delay to wait before the given attempt.
    fn delay(&self, attempt: u32) -> Duration {
        let _ = attempt;
        Duration::ZERO
    }
}

/// Exactly one immediate reconnect attempt per detected drop.
///
/// A stuck endpoint then requires a fresh manual attempt by the operator.
/// This deliberately avoids unbounded reconnect storms at the cost of
/// giving up early.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleAttempt;

impl RetryPolicy for SingleAttempt {
    fn should_attempt(&self, attempt: u32) -> bool {
        attempt <= 1
    }
}

/// Bounded exponential backoff with a delay cap.
#[derive(Debug, Clone, Copy)]
pub struct BoundedBackoff {
    /// Maximum attempts per detected drop.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for BoundedBackoff {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy for BoundedBackoff {
    fn should_attempt(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }

    fn delay(&self, attempt: u32) -> Duration {
        // First attempt is immediate; delays kick in on retries.
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = attempt.saturating_sub(2).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);
        delay.min(self.max_delay)
    }
}
