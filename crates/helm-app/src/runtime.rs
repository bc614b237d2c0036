//! Generic runtime for console orchestration.
//!
//! Drives the loop between the [`Console`] state machine and a
//! platform [`Driver`]: poll an event, let the console turn it into
//! actions, execute the actions, and feed any resulting channel events
//! back into the console until the queue drains.

use crate::{Console, ConsoleAction, ConsoleEvent, Driver};

/// Generic runtime binding a console to a driver.
pub struct Runtime<D: Driver> {
    driver: D,
    console: Console<D::Instant>,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime around a console and driver.
    pub fn new(driver: D, console: Console<D::Instant>) -> Self {
        Self { driver, console }
    }

    /// Console state, for inspection after the loop exits.
    pub fn console(&self) -> &Console<D::Instant> {
        &self.console
    }

    /// Run the event loop until quit or input exhaustion.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error on its own
    /// surfaces (event polling, rendering). Transport failures are not
    /// errors here; they loop back into the console as events.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.console)?;

        loop {
            let Some(event) = self.driver.poll_event().await? else {
                // Input gone; emit the neutral command and close cleanly.
                let actions = self.console.handle(ConsoleEvent::Teardown);
                let _ = self.process_actions(actions).await?;
                return Ok(());
            };

            let actions = self.console.handle(event);
            if self.process_actions(actions).await? {
                return Ok(());
            }
        }
    }

    /// Execute actions, feeding resulting events back into the console.
    /// Returns `true` if the console should quit.
    ///
    /// Iterative rather than recursive: an open failure during a
    /// reconnect can schedule another open.
    async fn process_actions(
        &mut self,
        initial_actions: Vec<ConsoleAction>,
    ) -> Result<bool, D::Error> {
        let mut pending = initial_actions;
        let mut quit = false;

        while !pending.is_empty() {
            let actions = std::mem::take(&mut pending);

            for action in actions {
                match action {
                    ConsoleAction::Open { endpoint, after } => {
                        if !after.is_zero() {
                            self.driver.sleep(after).await;
                        }
                        let event = match self.driver.open(&endpoint).await {
                            Ok(()) => ConsoleEvent::ChannelOpened { now: self.driver.now() },
                            Err(error) => {
                                ConsoleEvent::OpenFailed { reason: error.to_string() }
                            },
                        };
                        pending.extend(self.console.handle(event));
                    },
                    ConsoleAction::Transmit { channel, text } => {
                        // A failed write means the channel is going down;
                        // the close notification arrives via poll_event.
                        if let Err(error) = self.driver.transmit(channel, &text).await {
                            tracing::warn!(%channel, %error, "transmit failed");
                        }
                    },
                    ConsoleAction::Close { channel } => {
                        self.driver.close(channel).await;
                    },
                    ConsoleAction::Announce { channel } => {
                        self.driver.bind_channel(channel);
                    },
                    ConsoleAction::Alert { message } => {
                        self.driver.alert(&message);
                    },
                    ConsoleAction::Render => {
                        self.driver.render(&self.console)?;
                    },
                    ConsoleAction::Quit => {
                        quit = true;
                    },
                }
            }
        }

        Ok(quit)
    }
}
