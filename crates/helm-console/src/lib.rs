//! Production frontend for the Helm teleoperation console.
//!
//! Binds the generic [`helm_app::Runtime`] to real I/O: a
//! tokio-tungstenite WebSocket control channel and crossterm terminal
//! input. Incoming text frames (video/position telemetry) are forwarded
//! to passive consumers and never touch the control core.

#![forbid(unsafe_code)]

pub mod driver;
pub mod terminal;
pub mod transport;
