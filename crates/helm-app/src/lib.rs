//! Application layer for the Helm teleoperation console.
//!
//! Pure state machine plus generic runtime: the same orchestration code
//! runs against the production WebSocket/terminal driver and against test
//! doubles on virtual time.
//!
//! # Components
//!
//! - [`Console`]: wires the control surfaces to the session core
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: orchestration loop executing actions and feeding back
//!   channel events

#![forbid(unsafe_code)]

mod action;
mod console;
mod driver;
mod event;
mod input;
mod runtime;

pub use action::ConsoleAction;
pub use console::Console;
pub use driver::Driver;
pub use event::{ConsoleEvent, InputSource};
pub use input::{command_for, Key, KeyCommand};
pub use runtime::Runtime;
