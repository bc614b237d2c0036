//! Per-domain input arbitration.
//!
//! Each control surface (direction, hatch, speed) wraps one arbiter: a
//! small state machine that resolves possibly-overlapping raw input into
//! one authoritative command per domain. Rejections here are normal
//! guarded no-ops, not errors.

mod direction;
mod hatch;
mod speed;

pub use direction::DirectionArbiter;
pub use hatch::{HatchArbiter, DEFAULT_HATCH_SETTLE};
pub use speed::SpeedSelector;
