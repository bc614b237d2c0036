//! Control-channel session state machine.
//!
//! Owns the lifecycle of the single control channel: connect, disconnect,
//! liveness via heartbeat, and reconnection after unexpected drops. Uses
//! the action pattern: methods take time as input and return actions for
//! the driver to execute, keeping the state machine pure and testable.
//!
//! # State machine
//!
//! ```text
//! ┌──────────────┐ connect  ┌────────────┐ channel_opened ┌───────────┐
//! │ Disconnected │─────────>│ Connecting │───────────────>│ Connected │
//! └──────────────┘          └────────────┘                └───────────┘
//!        ^                        │ open_failed                 │ channel_closed
//!        │                        ↓                             ↓ (endpoint retained)
//!        │                 ┌──────────────┐  give up    ┌──────────────┐
//!        └─────────────────│ Disconnected │<────────────│ Reconnecting │
//!          disconnect()    └──────────────┘             └──────────────┘
//! ```
//!
//! # Invariants
//!
//! - At most one channel is live: the session owns the generation counter
//!   and only the latest [`ChannelId`] appears in transmit actions.
//! - Heartbeats are produced only in [`SessionState::Connected`], and
//!   never again after [`Session::disconnect`] returns.
//! - A heartbeat that cannot be sent is a logged skip; only an explicit
//!   close or error event drives reconnection.

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

use helm_proto::Command;

use crate::{
    error::SessionError,
    retry::{RetryPolicy, SingleAttempt},
};

/// Interval at which heartbeats are sent while connected.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Grace period between channel open and the first heartbeat.
///
/// The transport's open notification can fire before the underlying
/// connection is ready to carry traffic; this is an empirical settle
/// delay, not a protocol requirement.
pub const DEFAULT_HEARTBEAT_SETTLE: Duration = Duration::from_millis(700);

/// Operator-supplied channel endpoint.
///
/// Immutable once a connection attempt starts; retained after an
/// unexpected close solely so reconnection targets the same vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: String,
}

impl Endpoint {
    /// Validate and construct an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidEndpoint`] for an empty host, an
    /// empty port, or a port that is not a valid TCP port number.
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Result<Self, SessionError> {
        let host = host.into();
        let port = port.into();

        if host.trim().is_empty() {
            return Err(SessionError::InvalidEndpoint { reason: "empty host".to_string() });
        }
        if port.trim().is_empty() {
            return Err(SessionError::InvalidEndpoint { reason: "empty port".to_string() });
        }
        if port.parse::<u16>().is_err() {
            return Err(SessionError::InvalidEndpoint {
                reason: format!("port {port:?} is not a valid port number"),
            });
        }

        Ok(Self { host, port })
    }

    /// Host component.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port component.
    #[must_use]
    pub fn port(&self) -> &str {
        &self.port
    }

    /// WebSocket URL for this endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Identity of one opened channel.
///
/// Every successful open increments the generation, so commands routed to
/// a previous (closed) channel are distinguishable from commands routed to
/// the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Raw generation number.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "channel#{}", self.0)
    }
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No channel, no pending attempt.
    Disconnected,
    /// Operator-initiated open in flight.
    Connecting,
    /// Channel live; heartbeats flowing.
    Connected,
    /// Automatic open in flight after an unexpected drop.
    Reconnecting,
}

/// Actions returned by the session state machine.
///
/// The driver executes these: opening and closing transports, writing wire
/// text, and raising operator notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Open a transport to this endpoint, after the given delay.
    Open {
        /// Target endpoint.
        endpoint: Endpoint,
        /// Delay before opening (retry backoff; zero for immediate).
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

    /// Raise a non-blocking operator notification.
    Alert {
        /// Human-readable description.
        message: String,
    },
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Heartbeat period while connected.
    pub heartbeat_interval: Duration,
    /// Delay between open and the first heartbeat.
    pub heartbeat_settle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            heartbeat_settle: DEFAULT_HEARTBEAT_SETTLE,
        }
    }
}

/// Control-channel session manager.
///
/// One instance per process; the single-channel invariant is structural.
/// Pure state machine: no I/O, time passed in as parameters. Generic over
/// `Instant` to support both real and virtual time.
#[derive(Debug)]
pub struct Session<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Current state.
    state: SessionState,
    /// Configuration.
    config: SessionConfig,
    /// Retained endpoint. `None` until the first connect, cleared by
    /// operator-initiated disconnect.
    endpoint: Option<Endpoint>,
    /// Live channel. `Some` only in `Connected`.
    channel: Option<ChannelId>,
    /// Generation counter for channel identities.
    generations: u64,
    /// When the live channel opened.
    connected_at: Option<I>,
    /// When the last heartbeat was sent.
    last_heartbeat: Option<I>,
    /// Reconnect scheduling policy.
    retry: Box<dyn RetryPolicy>,
    /// 1-based attempt counter for the current drop. Reset on open.
    reconnect_attempt: u32,
}

impl<I> Session<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a session with the default single-attempt reconnect policy.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_retry_policy(config, Box::new(SingleAttempt))
    }

    /// Create a session with an explicit reconnect policy.
    #[must_use]
    pub fn with_retry_policy(config: SessionConfig, retry: Box<dyn RetryPolicy>) -> Self {
        Self {
            state: SessionState::Disconnected,
            config,
            endpoint: None,
            channel: None,
            generations: 0,
            connected_at: None,
            last_heartbeat: None,
            retry,
            reconnect_attempt: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Live channel identity. `None` unless `Connected`.
    #[must_use]
    pub fn channel(&self) -> Option<ChannelId> {
        self.channel
    }

    /// Retained endpoint. `None` before the first connect or after an
    /// operator-initiated disconnect.
    #[must_use]
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Begin an operator-initiated connection attempt.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`] unless currently `Disconnected`.
    pub fn connect(&mut self, endpoint: Endpoint) -> Result<Vec<SessionAction>, SessionError> {
        if self.state != SessionState::Disconnected {
            return Err(SessionError::InvalidState { state: self.state, operation: "connect" });
        }

        tracing::info!(%endpoint, "connecting");
        self.state = SessionState::Connecting;
        self.endpoint = Some(endpoint.clone());
        self.reconnect_attempt = 0;

        Ok(vec![SessionAction::Open { endpoint, after: Duration::ZERO }])
    }

    /// Record a successful channel open.
    ///
    /// Valid from `Connecting` or `Reconnecting`; returns the new channel
    /// identity. An open notification in any other state is stale (e.g.
    /// the operator disconnected while the open was in flight) and is
    /// ignored.
    pub fn channel_opened(&mut self, now: I) -> Option<ChannelId> {
        match self.state {
            SessionState::Connecting | SessionState::Reconnecting => {
                self.generations += 1;
                let channel = ChannelId(self.generations);
                self.state = SessionState::Connected;
                self.channel = Some(channel);
                self.connected_at = Some(now);
                self.last_heartbeat = None;
                self.reconnect_attempt = 0;
                tracing::info!(%channel, "channel open");
                Some(channel)
            },
            state => {
                tracing::warn!(?state, "ignoring stale open notification");
                None
            },
        }
    }

    /// Record a failed open attempt.
    ///
    /// During `Reconnecting` the retry policy decides whether another
    /// attempt follows; once it declines, the session settles in
    /// `Disconnected` and the operator must reconnect manually.
    pub fn open_failed(&mut self, reason: &str) -> Vec<SessionAction> {
        match self.state {
            SessionState::Connecting => {
                self.state = SessionState::Disconnected;
                tracing::warn!(reason, "connect failed");
                vec![SessionAction::Alert { message: format!("connection failed: {reason}") }]
            },
            SessionState::Reconnecting => {
                let next = self.reconnect_attempt.saturating_add(1);
                if self.retry.should_attempt(next) {
                    if let Some(endpoint) = self.endpoint.clone() {
                        self.reconnect_attempt = next;
                        let after = self.retry.delay(next);
                        tracing::info!(attempt = next, ?after, "retrying reconnect");
                        return vec![SessionAction::Open { endpoint, after }];
                    }
                    self.state = SessionState::Disconnected;
                    return vec![];
                }
                self.state = SessionState::Disconnected;
                tracing::warn!(reason, "reconnect failed, giving up");
                vec![SessionAction::Alert { message: format!("reconnect failed: {reason}") }]
            },
            state => {
                tracing::debug!(?state, reason, "ignoring open failure");
                vec![]
            },
        }
    }

    /// Record a channel close or transport error.
    ///
    /// Error and close paths converge here. If the endpoint is still
    /// retained (the close was not operator-initiated) a reconnect attempt
    /// is scheduled according to the retry policy.
    pub fn channel_closed(&mut self) -> Vec<SessionAction> {
        if self.state == SessionState::Disconnected {
            // Close notification for a channel we already tore down.
            return vec![];
        }

        self.channel = None;
        self.connected_at = None;
        self.last_heartbeat = None;

        match self.endpoint.clone() {
            Some(endpoint) if self.retry.should_attempt(1) => {
                tracing::warn!(%endpoint, "channel lost, reconnecting");
                self.state = SessionState::Reconnecting;
                self.reconnect_attempt = 1;
                vec![SessionAction::Open { endpoint, after: self.retry.delay(1) }]
            },
            _ => {
                self.state = SessionState::Disconnected;
                vec![SessionAction::Alert { message: "channel lost".to_string() }]
            },
        }
    }

    /// Tear down the session (operator-initiated). Idempotent.
    ///
    /// Clears the retained endpoint so the resulting close does not
    /// trigger reconnection, and deterministically stops the heartbeat: no
    /// heartbeat action can be produced after this returns.
    pub fn disconnect(&mut self) -> Vec<SessionAction> {
        self.endpoint = None;
        self.connected_at = None;
        self.last_heartbeat = None;
        self.reconnect_attempt = 0;
        self.state = SessionState::Disconnected;

        match self.channel.take() {
            Some(channel) => {
                tracing::info!(%channel, "disconnecting");
                vec![SessionAction::Close { channel }]
            },
            None => vec![],
        }
    }

    /// Periodic maintenance: heartbeat scheduling.
    ///
    /// Heartbeats start after the settle delay and repeat on the
    /// configured interval. Outside `Connected` this is a no-op.
    pub fn tick(&mut self, now: I) -> Vec<SessionAction> {
        if self.state != SessionState::Connected {
            return vec![];
        }
        let (Some(channel), Some(connected_at)) = (self.channel, self.connected_at) else {
            return vec![];
        };

        if now - connected_at < self.config.heartbeat_settle {
            return vec![];
        }

        let due = match self.last_heartbeat {
            None => true,
            Some(last) => now - last >= self.config.heartbeat_interval,
        };
        if !due {
            return vec![];
        }

        match Command::Heartbeat.encode() {
            Ok(text) => {
                self.last_heartbeat = Some(now);
                tracing::debug!(%channel, "heartbeat");
                vec![SessionAction::Transmit { channel, text }]
            },
            Err(error) => {
                tracing::error!(%error, "heartbeat encode failed, skipping");
                vec![]
            },
        }
    }

    /// Route a command to the live channel.
    ///
    /// Returns `None` (a logged skip, never an error) while not connected;
    /// transient disconnect windows are expected during reconnection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Protocol`] if encoding fails.
    pub fn transmit(&self, command: &Command) -> Result<Option<SessionAction>, SessionError> {
        match (self.state, self.channel) {
            (SessionState::Connected, Some(channel)) => {
                let text = command.encode()?;
                Ok(Some(SessionAction::Transmit { channel, text }))
            },
            (state, _) => {
                tracing::debug!(?state, ?command, "send skipped, not connected");
                Ok(None)
            },
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
