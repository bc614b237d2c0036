//! Typed command set and JSON codec.
//!
//! Every client-to-vehicle message is a `Command`. On the wire a command is
//! a single JSON object tagged by `type`, with control messages further
//! tagged by `command`:
//!
//! ```text
//! {"type":"heartbeat"}
//! {"type":"control","command":"direction","forward":true,"left":false,"right":false}
//! {"type":"control","command":"speed","level":"mid"}
//! {"type":"control","command":"hatch","action":"open"}
//! ```
//!
//! # Invariants
//!
//! - Encoding is deterministic: the same command always produces the same
//!   text.
//! - The codec does not enforce direction mutual exclusion; that is owned
//!   by the direction arbiter. `Command::direction` is the safe
//!   constructor that cannot express two directions at once.

use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

/// A propulsion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Drive forward.
    Forward,
    /// Turn left.
    Left,
    /// Turn right.
    Right,
}

/// Propulsion speed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedLevel {
    /// Low speed.
    Low,
    /// Medium speed.
    Mid,
    /// High speed.
    High,
}

/// Hatch actuator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HatchAction {
    /// Open the hatch.
    Open,
    /// Close the hatch.
    Close,
}

/// Control payloads, tagged by `command` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum ControlCommand {
    /// Propulsion direction flags. At most one is true in any command the
    /// console emits; the wire format itself does not forbid more.
    Direction {
        /// Forward propulsion asserted.
        forward: bool,
        /// Left turn asserted.
        left: bool,
        /// Right turn asserted.
        right: bool,
    },

    /// Speed selection.
    Speed {
        /// Selected level.
        level: SpeedLevel,
    },

    /// Hatch actuation.
    Hatch {
        /// Requested action.
        action: HatchAction,
    },
}

/// A client-to-vehicle message, tagged by `type` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    /// Liveness probe, no payload.
    Heartbeat,

    /// Device control message.
    Control(ControlCommand),
}

impl Command {
    /// Direction command asserting `direction`, or the all-false neutral
    /// command when `direction` is `None`.
    #[must_use]
    pub fn direction(direction: Option<Direction>) -> Self {
        Self::Control(ControlCommand::Direction {
            forward: direction == Some(Direction::Forward),
            left: direction == Some(Direction::Left),
            right: direction == Some(Direction::Right),
        })
    }

    /// Speed selection command.
    #[must_use]
    pub fn speed(level: SpeedLevel) -> Self {
        Self::Control(ControlCommand::Speed { level })
    }

    /// Hatch actuation command.
    #[must_use]
    pub fn hatch(action: HatchAction) -> Self {
        Self::Control(ControlCommand::Hatch { action })
    }

    /// Encode into wire text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encode`] if serialization fails. This does
    /// not happen for any value constructible through this API; the error
    /// path exists so callers propagate instead of panicking.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Decode wire text into a command.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Decode`] if the text is not valid JSON or
    /// does not match any known message shape.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_wire_shape() {
        let text = Command::Heartbeat.encode().map_err(|e| e.to_string());
        assert_eq!(text, Ok(r#"{"type":"heartbeat"}"#.to_string()));
    }

    #[test]
    fn direction_wire_shape() {
        let text =
            Command::direction(Some(Direction::Forward)).encode().map_err(|e| e.to_string());
        assert_eq!(
            text,
            Ok(r#"{"type":"control","command":"direction","forward":true,"left":false,"right":false}"#.to_string())
        );
    }

    #[test]
    fn neutral_direction_asserts_nothing() {
        let command = Command::direction(None);
        assert_eq!(
            command,
            Command::Control(ControlCommand::Direction {
                forward: false,
                left: false,
                right: false
            })
        );
    }

    #[test]
    fn speed_wire_shape() {
        let text = Command::speed(SpeedLevel::Mid).encode().map_err(|e| e.to_string());
        assert_eq!(text, Ok(r#"{"type":"control","command":"speed","level":"mid"}"#.to_string()));
    }

    #[test]
    fn hatch_wire_shape() {
        let text = Command::hatch(HatchAction::Open).encode().map_err(|e| e.to_string());
        assert_eq!(
            text,
            Ok(r#"{"type":"control","command":"hatch","action":"open"}"#.to_string())
        );
    }

    #[test]
    fn decode_rejects_unknown_type() {
        assert!(Command::decode(r#"{"type":"telemetry"}"#).is_err());
        assert!(Command::decode("not json").is_err());
    }
}
