//! Direction arbitration.
//!
//! Only one propulsion direction is physically meaningful at a time, but
//! raw input can be momentarily inconsistent: several keys held at once,
//! or keyboard and pointer overlapping. This arbiter is the single
//! authority that the emitted command stream never asserts two directions
//! simultaneously.

use helm_proto::{Command, Direction};

/// State machine resolving press/release events into direction commands.
///
/// State is the currently commanded direction, or none. A press of a new
/// direction overrides the previous one; a release only stops the vehicle
/// if it matches the active direction, so stale releases of an
/// already-superseded direction are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionArbiter {
    active: Option<Direction>,
}

impl DirectionArbiter {
    /// Create an arbiter with no active direction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently commanded direction.
    #[must_use]
    pub fn active(&self) -> Option<Direction> {
        self.active
    }

    /// Handle a press event from any input surface.
    ///
    /// Returns the command to emit, or `None` when the direction is
    /// already active (re-pressing must not produce duplicates).
    pub fn press(&mut self, direction: Direction) -> Option<Command> {
        if self.active == Some(direction) {
            tracing::trace!(?direction, "press ignored, already active");
            return None;
        }
        self.active = Some(direction);
        Some(Command::direction(Some(direction)))
    }

    /// Handle a release event from any input surface.
    ///
    /// Returns the neutral command when the released direction is the
    /// active one, `None` for stale releases.
    pub fn release(&mut self, direction: Direction) -> Option<Command> {
        if self.active != Some(direction) {
            tracing::trace!(?direction, active = ?self.active, "stale release ignored");
            return None;
        }
        self.active = None;
        Some(Command::direction(None))
    }

    /// Unconditional neutral command for surface teardown.
    ///
    /// Emitted regardless of current state so the vehicle never keeps
    /// moving after the operator loses control input.
    pub fn neutral(&mut self) -> Command {
        self.active = None;
        Command::direction(None)
    }
}
