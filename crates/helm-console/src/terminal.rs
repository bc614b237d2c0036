//! Terminal setup and key translation.
//!
//! Raw mode plus, where the terminal supports it, the kitty keyboard
//! enhancement so key release events reach the direction surface. On
//! terminals without the enhancement direction keys degrade to momentary
//! pulses; the arbiter semantics are unchanged.

use std::io::{self, stdout};

use crossterm::{
    event::{
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement},
    ExecutableCommand,
};
use helm_app::Key;

/// RAII guard for terminal raw mode and keyboard enhancement.
pub struct TerminalGuard {
    enhanced: bool,
}

impl TerminalGuard {
    /// Enter raw mode and request key release reporting.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
        if enhanced {
            stdout().execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        } else {
            tracing::warn!("terminal lacks key-release reporting; direction keys are momentary");
        }

        Ok(Self { enhanced })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = stdout().execute(PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
    }
}

/// Translate a crossterm key code into the console's key model.
#[must_use]
pub fn key_for(code: crossterm::event::KeyCode) -> Option<Key> {
    use crossterm::event::KeyCode;
    match code {
        KeyCode::Char(c) => Some(Key::Char(c.to_ascii_lowercase())),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Esc => Some(Key::Esc),
        _ => None,
    }
}
