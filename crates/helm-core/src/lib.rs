//! Core state machines for the Helm teleoperation console.
//!
//! Everything in this crate is sans-IO: state machines consume events plus
//! the current instant and return actions for a driver to execute. No
//! sockets, no timers, no global state, which keeps the whole control
//! lifecycle testable on synthetic time.
//!
//! # Components
//!
//! - [`Session`]: control-channel lifecycle and heartbeat supervision
//! - [`RetryPolicy`]: pluggable reconnect policy behind the session
//! - [`DirectionArbiter`], [`HatchArbiter`], [`SpeedSelector`]: per-domain
//!   input arbitration
//! - [`Environment`]: time abstraction for production vs. simulated runs

#![forbid(unsafe_code)]

pub mod arbiter;
pub mod env;
mod error;
mod retry;
mod session;

pub use arbiter::{DirectionArbiter, HatchArbiter, SpeedSelector};
pub use env::Environment;
pub use error::SessionError;
pub use retry::{BoundedBackoff, RetryPolicy, SingleAttempt};
pub use session::{
    ChannelId, Endpoint, Session, SessionAction, SessionConfig, SessionState,
    DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_HEARTBEAT_SETTLE,
};
