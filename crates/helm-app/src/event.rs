//! Console input events.
//!
//! Events originate from three places: operator input (key and pointer
//! surfaces), the transport (open/close/fail notifications), and the
//! periodic tick that drives heartbeat scheduling.

use helm_proto::{Direction, SpeedLevel};

/// Where a raw direction event came from.
///
/// The arbiter treats both sources identically; the distinction exists
/// for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Keyboard key.
    Keyboard,
    /// Pointer button.
    Pointer,
}

/// Events processed by the console state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent<I> {
    /// Operator requested a connection.
    Connect {
        /// Target host.
        host: String,
        /// Target port.
        port: String,
    },

    /// Operator requested disconnection.
    Disconnect,

    /// A direction input went down.
    Press {
        /// Originating surface.
        source: InputSource,
        /// Direction of the input.
        direction: Direction,
    },

    /// A direction input went up.
    Release {
        /// Originating surface.
        source: InputSource,
        /// Direction of the input.
        direction: Direction,
    },

    /// Operator selected a speed level.
    SelectSpeed {
        /// Selected level.
        level: SpeedLevel,
    },

    /// Operator requested a hatch toggle.
    ToggleHatch {
        /// Current instant, for the lockout window.
        now: I,
    },

    /// The transport finished opening a channel.
    ChannelOpened {
        /// Instant the channel opened.
        now: I,
    },

    /// The channel closed or errored.
    ChannelClosed,

    /// An open attempt failed.
    OpenFailed {
        /// Failure description.
        reason: String,
    },

    /// Periodic tick.
    Tick {
        /// Current instant.
        now: I,
    },

    /// Console is being torn down (quit, window close).
    Teardown,
}
