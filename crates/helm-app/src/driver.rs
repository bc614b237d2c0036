//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] decouples the console runtime from specific I/O
//! implementations. The production driver wraps a WebSocket transport and
//! a terminal; tests implement the trait with in-memory doubles on
//! virtual time, and the generic [`crate::Runtime`] handles orchestration
//! in both cases.

use std::{future::Future, ops::Sub, time::Duration};

use helm_core::{ChannelId, Endpoint};

use crate::{Console, ConsoleEvent};

/// Abstracts platform I/O for the console runtime.
pub trait Driver {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait for the next event.
    ///
    /// Returns `None` when the input source is exhausted; the runtime
    /// then tears the console down.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<ConsoleEvent<Self::Instant>>, Self::Error>>;

    /// Open a transport to the endpoint.
    ///
    /// On success the transport is held as pending until
    /// [`Driver::bind_channel`] assigns it an identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be established; the
    /// runtime feeds it back as an open-failure event.
    fn open(&mut self, endpoint: &Endpoint) -> impl Future<Output = Result<(), Self::Error>>;

    /// Bind the pending transport to its channel identity and inform
    /// passive telemetry consumers.
    fn bind_channel(&mut self, channel: ChannelId);

    /// Write wire text on the given channel.
    ///
    /// Text routed to a channel that is no longer current must be
    /// discarded, not misdelivered.
    fn transmit(
        &mut self,
        channel: ChannelId,
        text: &str,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Close the given channel's transport.
    fn close(&mut self, channel: ChannelId) -> impl Future<Output = ()>;

    /// Raise a non-blocking operator notification.
    fn alert(&mut self, message: &str);

    /// Refresh the status display.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, console: &Console<Self::Instant>) -> Result<(), Self::Error>;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Sleep for the given duration (retry backoff).
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}
