//! Wire protocol for the Helm control channel.
//!
//! The control channel carries message-oriented JSON text in both
//! directions. This crate defines the typed command set the console sends
//! to the vehicle and the codec between those types and the wire text.
//!
//! The codec is deterministic and free of side effects: encoding never
//! touches a channel, and callers are responsible for discarding output
//! they cannot send.

#![forbid(unsafe_code)]

mod command;
mod errors;

pub use command::{Command, ControlCommand, Direction, HatchAction, SpeedLevel};
pub use errors::ProtocolError;
