//! Production driver: WebSocket transport plus terminal input.
//!
//! Implements [`helm_app::Driver`] over real I/O. The driver owns at most
//! one live socket; wire text routed to a channel generation that is no
//! longer current is discarded rather than misdelivered to a fresh
//! connection.

use std::{
    collections::VecDeque,
    io,
    time::{Duration, Instant},
};

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use helm_app::{Console, ConsoleEvent, Driver, InputSource, Key, KeyCommand};
use helm_core::env::SystemEnv;
use helm_core::{ChannelId, Endpoint, Environment};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    terminal,
    transport::{self, TransportError, TransportEvent, WsChannel},
};

/// Tick period driving heartbeat scheduling.
const TICK_PERIOD: Duration = Duration::from_millis(250);

/// Driver errors.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Terminal I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Production console driver.
pub struct ConsoleDriver {
    env: SystemEnv,
    /// Operator-supplied target, reused for manual reconnect.
    host: String,
    port: String,
    terminal: EventStream,
    tick: tokio::time::Interval,
    /// Kept so the notification channel never closes while idle.
    notify_tx: mpsc::Sender<TransportEvent>,
    notify_rx: mpsc::Receiver<TransportEvent>,
    /// Events queued by the driver itself (initial connect).
    queued: VecDeque<ConsoleEvent<Instant>>,
    /// Socket opened but not yet bound to a channel identity.
    staged: Option<WsChannel>,
    /// The live channel.
    current: Option<(ChannelId, WsChannel)>,
}

impl ConsoleDriver {
    /// Create a driver that connects to `host:port` on startup.
    #[must_use]
    pub fn new(host: String, port: String) -> Self {
        let (notify_tx, notify_rx) = mpsc::channel(32);
        let mut queued = VecDeque::new();
        queued.push_back(ConsoleEvent::Connect { host: host.clone(), port: port.clone() });

        Self {
            env: SystemEnv::new(),
            host,
            port,
            terminal: EventStream::new(),
            tick: tokio::time::interval(TICK_PERIOD),
            notify_tx,
            notify_rx,
            queued,
            staged: None,
            current: None,
        }
    }

    fn map_key(&self, key: Key, kind: KeyEventKind) -> Option<ConsoleEvent<Instant>> {
        let command = helm_app::command_for(key)?;

        match (command, kind) {
            (KeyCommand::Direction(direction), KeyEventKind::Press) => {
                Some(ConsoleEvent::Press { source: InputSource::Keyboard, direction })
            },
            (KeyCommand::Direction(direction), KeyEventKind::Release) => {
                Some(ConsoleEvent::Release { source: InputSource::Keyboard, direction })
            },
            (KeyCommand::ToggleHatch, KeyEventKind::Press) => {
                Some(ConsoleEvent::ToggleHatch { now: self.env.now() })
            },
            (KeyCommand::SelectSpeed(level), KeyEventKind::Press) => {
                Some(ConsoleEvent::SelectSpeed { level })
            },
            (KeyCommand::Reconnect, KeyEventKind::Press) => Some(ConsoleEvent::Connect {
                host: self.host.clone(),
                port: self.port.clone(),
            }),
            (KeyCommand::Quit, KeyEventKind::Press) => Some(ConsoleEvent::Teardown),
            _ => None,
        }
    }

    fn map_terminal_event(&self, event: &Event) -> Option<ConsoleEvent<Instant>> {
        match event {
            Event::Key(key)
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Release) =>
            {
                terminal::key_for(key.code).and_then(|k| self.map_key(k, key.kind))
            },
            _ => None,
        }
    }
}

impl Driver for ConsoleDriver {
    type Error = DriverError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<ConsoleEvent<Instant>>, DriverError> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Ok(Some(event));
            }

            tokio::select! {
                maybe_event = self.terminal.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if let Some(mapped) = self.map_terminal_event(&event) {
                            return Ok(Some(mapped));
                        }
                    },
                    Some(Err(error)) => return Err(DriverError::Io(error)),
                    None => return Ok(None),
                },

                Some(note) = self.notify_rx.recv() => match note {
                    TransportEvent::Closed => return Ok(Some(ConsoleEvent::ChannelClosed)),
                    TransportEvent::Telemetry(text) => {
                        // Passive consumers (video, map) take it from here.
                        tracing::debug!(len = text.len(), "telemetry frame");
                    },
                },

                _ = self.tick.tick() => {
                    return Ok(Some(ConsoleEvent::Tick { now: self.env.now() }));
                },
            }
        }
    }

    async fn open(&mut self, endpoint: &Endpoint) -> Result<(), DriverError> {
        let channel = transport::open(&endpoint.url(), self.notify_tx.clone()).await?;
        self.staged = Some(channel);
        Ok(())
    }

    fn bind_channel(&mut self, channel: ChannelId) {
        match self.staged.take() {
            Some(socket) => {
                if let Some((old, old_socket)) = self.current.replace((channel, socket)) {
                    tracing::debug!(%old, "dropping superseded channel");
                    old_socket.stop();
                }
                // Announcement point for passive telemetry consumers.
                tracing::info!(%channel, "control channel live");
            },
            None => tracing::warn!(%channel, "bind without a staged socket"),
        }
    }

    async fn transmit(&mut self, channel: ChannelId, text: &str) -> Result<(), DriverError> {
        match &self.current {
            Some((current, socket)) if *current == channel => {
                socket.send(text.to_string()).await?;
                Ok(())
            },
            _ => {
                tracing::warn!(%channel, "discarding text routed to a stale channel");
                Ok(())
            },
        }
    }

    async fn close(&mut self, channel: ChannelId) {
        match self.current.take() {
            // Graceful: queued text (the teardown's neutral command) is
            // drained onto the socket before the task finishes.
            Some((current, socket)) if current == channel => socket.close().await,
            other => {
                self.current = other;
                tracing::debug!(%channel, "close for a channel we no longer hold");
            },
        }
    }

    fn alert(&mut self, message: &str) {
        // Non-blocking operator notification; the session is unaffected.
        tracing::error!(message, "operator alert");
    }

    fn render(&mut self, console: &Console<Instant>) -> Result<(), DriverError> {
        tracing::info!(
            state = ?console.session_state(),
            direction = ?console.direction().active(),
            speed = ?console.speed().last(),
            hatch_open = console.hatch().is_open(),
            status = console.status().unwrap_or(""),
            "console status"
        );
        Ok(())
    }

    fn now(&self) -> Instant {
        self.env.now()
    }

    async fn sleep(&self, duration: Duration) {
        self.env.sleep(duration).await;
    }
}
