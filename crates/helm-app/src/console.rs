//! Console state machine.
//!
//! Wires the three control surfaces (direction, speed, hatch) to the
//! session core: raw input events go through the matching arbiter, the
//! resulting commands are routed through the session to the live channel,
//! and channel lifecycle events feed back into the session.
//!
//! Surfaces never hold a channel reference; every send asks the session,
//! so a reconnect transparently redirects subsequent commands.

use std::{ops::Sub, time::Duration};

use helm_core::{
    DirectionArbiter, Endpoint, HatchArbiter, Session, SessionAction, SessionConfig,
    SessionState, SpeedSelector,
};
use helm_proto::Command;

use crate::{ConsoleAction, ConsoleEvent};

/// Top-level console state machine.
///
/// Pure: consumes [`ConsoleEvent`]s and produces [`ConsoleAction`]s for
/// the runtime to execute. One instance per process, owning the single
/// session.
#[derive(Debug)]
pub struct Console<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    session: Session<I>,
    direction: DirectionArbiter,
    hatch: HatchArbiter<I>,
    speed: SpeedSelector,
    /// Transient status line. `None` if nothing to show.
    status: Option<String>,
}

impl<I> Console<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a console with default session configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(Session::new(SessionConfig::default()))
    }

    /// Create a console around an explicitly configured session.
    #[must_use]
    pub fn with_session(session: Session<I>) -> Self {
        Self {
            session,
            direction: DirectionArbiter::new(),
            hatch: HatchArbiter::new(),
            speed: SpeedSelector::new(),
            status: None,
        }
    }

    /// Session state, for display.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Direction surface, for display.
    #[must_use]
    pub fn direction(&self) -> &DirectionArbiter {
        &self.direction
    }

    /// Hatch surface, for display.
    #[must_use]
    pub fn hatch(&self) -> &HatchArbiter<I> {
        &self.hatch
    }

    /// Speed surface, for display.
    #[must_use]
    pub fn speed(&self) -> &SpeedSelector {
        &self.speed
    }

    /// Transient status line. `None` if nothing to show.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: ConsoleEvent<I>) -> Vec<ConsoleAction> {
        match event {
            ConsoleEvent::Connect { host, port } => self.handle_connect(&host, &port),
            ConsoleEvent::Disconnect => {
                self.status = Some("disconnected".to_string());
                let session_actions = self.session.disconnect();
                let mut actions = self.map_session(session_actions);
                actions.push(ConsoleAction::Render);
                actions
            },
            ConsoleEvent::Press { source, direction } => {
                tracing::trace!(?source, ?direction, "press");
                match self.direction.press(direction) {
                    Some(command) => {
                        let mut actions = self.transmit(&command);
                        actions.push(ConsoleAction::Render);
                        actions
                    },
                    None => vec![],
                }
            },
            ConsoleEvent::Release { source, direction } => {
                tracing::trace!(?source, ?direction, "release");
                match self.direction.release(direction) {
                    Some(command) => {
                        let mut actions = self.transmit(&command);
                        actions.push(ConsoleAction::Render);
                        actions
                    },
                    None => vec![],
                }
            },
            ConsoleEvent::SelectSpeed { level } => {
                let command = self.speed.select(level);
                let mut actions = self.transmit(&command);
                actions.push(ConsoleAction::Render);
                actions
            },
            ConsoleEvent::ToggleHatch { now } => match self.hatch.toggle(now) {
                Some(command) => {
                    self.status = None;
                    let mut actions = self.transmit(&command);
                    actions.push(ConsoleAction::Render);
                    actions
                },
                None => {
                    // Normal guarded rejection, surfaced as status only.
                    self.status = Some("hatch busy".to_string());
                    vec![ConsoleAction::Render]
                },
            },
            ConsoleEvent::ChannelOpened { now } => match self.session.channel_opened(now) {
                Some(channel) => {
                    self.status = Some(format!("connected ({channel})"));
                    vec![ConsoleAction::Announce { channel }, ConsoleAction::Render]
                },
                None => vec![],
            },
            ConsoleEvent::ChannelClosed => {
                let session_actions = self.session.channel_closed();
                let mut actions = self.map_session(session_actions);
                actions.push(ConsoleAction::Render);
                actions
            },
            ConsoleEvent::OpenFailed { reason } => {
                let session_actions = self.session.open_failed(&reason);
                let mut actions = self.map_session(session_actions);
                actions.push(ConsoleAction::Render);
                actions
            },
            ConsoleEvent::Tick { now } => map_session_actions(self.session.tick(now)),
            ConsoleEvent::Teardown => self.handle_teardown(),
        }
    }

    fn handle_connect(&mut self, host: &str, port: &str) -> Vec<ConsoleAction> {
        let endpoint = match Endpoint::new(host, port) {
            Ok(endpoint) => endpoint,
            Err(error) => {
                self.status = Some(error.to_string());
                return vec![
                    ConsoleAction::Alert { message: error.to_string() },
                    ConsoleAction::Render,
                ];
            },
        };

        match self.session.connect(endpoint) {
            Ok(actions) => {
                self.status = Some("connecting".to_string());
                let mut actions = self.map_session(actions);
                actions.push(ConsoleAction::Render);
                actions
            },
            Err(error) => {
                tracing::warn!(%error, "connect rejected");
                self.status = Some(error.to_string());
                vec![ConsoleAction::Alert { message: error.to_string() }, ConsoleAction::Render]
            },
        }
    }

    /// Teardown ordering matters: the neutral direction command must go
    /// out before the close produced by the same teardown, so the final
    /// command is not dropped.
    fn handle_teardown(&mut self) -> Vec<ConsoleAction> {
        let neutral = self.direction.neutral();
        let mut actions = self.transmit(&neutral);
        let session_actions = self.session.disconnect();
        actions.extend(self.map_session(session_actions));
        actions.push(ConsoleAction::Quit);
        actions
    }

    /// Map session actions, mirroring any alert onto the status line so
    /// the next render shows it alongside the driver's notification.
    fn map_session(&mut self, actions: Vec<SessionAction>) -> Vec<ConsoleAction> {
        let actions = map_session_actions(actions);
        for action in &actions {
            if let ConsoleAction::Alert { message } = action {
                self.status = Some(message.clone());
            }
        }
        actions
    }

    /// Route a command through the session to the live channel.
    ///
    /// Send skipped while not connected is a logged no-op; encode failures
    /// are logged and dropped (nothing here is fatal).
    fn transmit(&mut self, command: &Command) -> Vec<ConsoleAction> {
        match self.session.transmit(command) {
            Ok(Some(action)) => map_session_actions(vec![action]),
            Ok(None) => vec![],
            Err(error) => {
                tracing::error!(%error, "command encode failed, dropping");
                vec![]
            },
        }
    }
}

impl<I> Default for Console<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new()
    }
}

fn map_session_actions(actions: Vec<SessionAction>) -> Vec<ConsoleAction> {
    actions
        .into_iter()
        .map(|action| match action {
            SessionAction::Open { endpoint, after } => ConsoleAction::Open { endpoint, after },
            SessionAction::Close { channel } => ConsoleAction::Close { channel },
            SessionAction::Transmit { channel, text } => {
                ConsoleAction::Transmit { channel, text }
            },
            SessionAction::Alert { message } => ConsoleAction::Alert { message },
        })
        .collect()
}
