//! Hatch arbitration.
//!
//! The hatch actuator has nonzero travel time and no completion feedback
//! from the vehicle, so each accepted toggle opens a fixed lockout window
//! during which further toggles are rejected. The window is time-based,
//! never cancellable, and deliberately survives a reconnect.

use std::{ops::Sub, time::Duration};

use helm_proto::{Command, HatchAction};

/// Lockout after each toggle: actuator travel (~0.8 s) plus margin.
pub const DEFAULT_HATCH_SETTLE: Duration = Duration::from_millis(1500);

/// State machine gating hatch toggles behind a settle window.
#[derive(Debug, Clone, Copy)]
pub struct HatchArbiter<I> {
    /// Logical hatch position as last commanded.
    open: bool,
    /// When the last toggle was accepted. `None` before the first.
    last_toggle: Option<I>,
    /// Lockout duration.
    settle: Duration,
}

impl<I> HatchArbiter<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create an arbiter with the default settle window, hatch closed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settle(DEFAULT_HATCH_SETTLE)
    }

    /// Create an arbiter with an explicit settle window.
    #[must_use]
    pub fn with_settle(settle: Duration) -> Self {
        Self { open: false, last_toggle: None, settle }
    }

    /// Logical hatch position as last commanded.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the lockout window is currently open.
    #[must_use]
    pub fn is_locked(&self, now: I) -> bool {
        match self.last_toggle {
            Some(last) => now - last < self.settle,
            None => false,
        }
    }

    /// Request a toggle.
    ///
    /// Returns the command to emit on acceptance, `None` while locked.
    /// A rejected toggle has no effect at all; the arbiter does not queue
    /// it for later.
    pub fn toggle(&mut self, now: I) -> Option<Command> {
        if self.is_locked(now) {
            tracing::debug!("hatch toggle rejected, actuator settling");
            return None;
        }

        self.open = !self.open;
        self.last_toggle = Some(now);

        let action = if self.open { HatchAction::Open } else { HatchAction::Close };
        Some(Command::hatch(action))
    }
}

impl<I> Default for HatchArbiter<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::testing::SimClock;

    use super::*;

    #[test]
    fn toggle_inside_window_is_rejected() {
        let mut clock = SimClock::new();
        let mut hatch = HatchArbiter::new();

        let first = hatch.toggle(clock.now());
        assert_eq!(first, Some(Command::hatch(HatchAction::Open)));

        let early = clock.advance(Duration::from_millis(400));
        assert_eq!(hatch.toggle(early), None);
        assert!(hatch.is_open(), "rejected toggle must not flip state");
    }

    #[test]
    fn toggle_after_window_emits_opposite_action() {
        let mut clock = SimClock::new();
        let mut hatch = HatchArbiter::new();

        let _ = hatch.toggle(clock.now());
        let later = clock.advance(DEFAULT_HATCH_SETTLE);
        assert_eq!(hatch.toggle(later), Some(Command::hatch(HatchAction::Close)));
    }

    #[test]
    fn lockout_clears_exactly_at_settle() {
        let mut clock = SimClock::new();
        let mut hatch = HatchArbiter::with_settle(Duration::from_millis(1000));

        let _ = hatch.toggle(clock.now());
        assert!(hatch.is_locked(clock.advance(Duration::from_millis(999))));
        assert!(!hatch.is_locked(clock.advance(Duration::from_millis(1))));
    }
}
