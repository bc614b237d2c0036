//! Protocol error types.

use thiserror::Error;

/// Errors produced by the wire codec.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Serialization to wire text failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Wire text did not parse as a known message.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
