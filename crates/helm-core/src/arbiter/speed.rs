//! Speed selection.
//!
//! No exclusivity or lockout: every discrete selection emits immediately,
//! and re-selecting the current level is harmless and re-sent.

use helm_proto::{Command, SpeedLevel};

/// Stateless-by-design speed surface; remembers the last selection only
/// for display.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedSelector {
    last: Option<SpeedLevel>,
}

impl SpeedSelector {
    /// Create a selector with no selection yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last selected level.
    #[must_use]
    pub fn last(&self) -> Option<SpeedLevel> {
        self.last
    }

    /// Select a level. Always emits.
    pub fn select(&mut self, level: SpeedLevel) -> Command {
        self.last = Some(level);
        Command::speed(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reselection_still_emits() {
        let mut speed = SpeedSelector::new();
        assert_eq!(speed.select(SpeedLevel::High), Command::speed(SpeedLevel::High));
        assert_eq!(speed.select(SpeedLevel::High), Command::speed(SpeedLevel::High));
        assert_eq!(speed.last(), Some(SpeedLevel::High));
    }
}
