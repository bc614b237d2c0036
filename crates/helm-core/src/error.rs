//! Error types for the session core.
//!
//! Only genuine failures become errors. Sends attempted while disconnected
//! and arbiter rejections are guarded no-ops, logged for diagnostics and
//! never surfaced as `SessionError`.

use thiserror::Error;

use crate::session::SessionState;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Operator-supplied endpoint is malformed.
    #[error("invalid endpoint: {reason}")]
    InvalidEndpoint {
        /// Why the endpoint was rejected.
        reason: String,
    },

    /// Operation is not valid in the current state.
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// State when the operation was attempted.
        state: SessionState,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// Wire codec failure.
    #[error(transparent)]
    Protocol(#[from] helm_proto::ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_names_the_operation() {
        let err = SessionError::InvalidState {
            state: SessionState::Connected,
            operation: "connect",
        };
        assert_eq!(err.to_string(), "invalid state transition: cannot connect from Connected");
    }
}
