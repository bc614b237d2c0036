//! Terminal-agnostic keyboard mapping.
//!
//! Decouples the console from terminal libraries so the same bindings
//! work in production and in simulation.

use helm_proto::{Direction, SpeedLevel};

/// Keyboard input abstraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character.
    Char(char),
    /// Up arrow key.
    Up,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Escape key.
    Esc,
}

/// What a key press means to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Drive in this direction while held.
    Direction(Direction),
    /// Toggle the hatch.
    ToggleHatch,
    /// Select a speed level.
    SelectSpeed(SpeedLevel),
    /// Retry the last endpoint manually.
    Reconnect,
    /// Quit the console.
    Quit,
}

/// Binding table: WASD/arrows for direction, `h` hatch, `1`-`3` speed,
/// `r` manual reconnect, `q`/Esc quit.
#[must_use]
pub fn command_for(key: Key) -> Option<KeyCommand> {
    match key {
        Key::Up | Key::Char('w') => Some(KeyCommand::Direction(Direction::Forward)),
        Key::Left | Key::Char('a') => Some(KeyCommand::Direction(Direction::Left)),
        Key::Right | Key::Char('d') => Some(KeyCommand::Direction(Direction::Right)),
        Key::Char('h') => Some(KeyCommand::ToggleHatch),
        Key::Char('1') => Some(KeyCommand::SelectSpeed(SpeedLevel::Low)),
        Key::Char('2') => Some(KeyCommand::SelectSpeed(SpeedLevel::Mid)),
        Key::Char('3') => Some(KeyCommand::SelectSpeed(SpeedLevel::High)),
        Key::Char('r') => Some(KeyCommand::Reconnect),
        Key::Esc | Key::Char('q') => Some(KeyCommand::Quit),
        Key::Char(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_arrows_agree() {
        assert_eq!(command_for(Key::Char('w')), command_for(Key::Up));
        assert_eq!(command_for(Key::Char('a')), command_for(Key::Left));
        assert_eq!(command_for(Key::Char('d')), command_for(Key::Right));
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(command_for(Key::Char('z')), None);
    }
}
