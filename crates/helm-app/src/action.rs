//! Console side-effects for the driver to execute.

use std::time::Duration;

use helm_core::{ChannelId, Endpoint};

/// Actions produced by the console state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    /// Open a transport to this endpoint after the given delay.
    Open {
        /// Target endpoint.
        endpoint: Endpoint,
        /// Retry backoff; zero for immediate.
        after: Duration,
    },

    /// Close this channel's transport.
    Close {
        /// Channel to close.
        channel: ChannelId,
    },

    /// Write wire text on this channel.
    Transmit {
        /// Channel the text is routed to.
        channel: ChannelId,
        /// Encoded wire text.
        text: String,
    },

    /// Tell passive telemetry consumers (video, map) which channel is
    /// live now.
    Announce {
        /// Newly opened channel.
        channel: ChannelId,
    },

    /// Raise a non-blocking operator notification.
    Alert {
        /// Human-readable description.
        message: String,
    },

    /// Refresh the status display.
    Render,

    /// Exit the console.
    Quit,
}
