//! Session-level error taxonomy.

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::transport::TransportError;
use derive_more::{Display, Error};
use std::time::Duration;
use tictactoe_core::{CoordinateError, Position};

/// Everything that can stop or interrupt a game session.
///
/// [`MalformedCoordinate`](SessionError::MalformedCoordinate) and
/// [`OccupiedCell`](SessionError::OccupiedCell) are handled inside the turn
/// loop by asking the same side again. The rest end the session.
#[derive(Debug, Display, Error)]
pub enum SessionError {
    /// No message or acknowledgment within the wait budget.
    #[display("Communication lost: no reply within {:?}", waited)]
    ProtocolTimeout {
        /// How long the receive waited.
        waited: Duration,
    },

    /// The coordinate did not parse.
    #[display("{}", _0)]
    MalformedCoordinate(CoordinateError),

    /// The target square is taken.
    #[display("Square {} is already occupied", position)]
    OccupiedCell {
        /// Requested square.
        position: Position,
    },

    /// The move engine failed after all retries.
    #[display("Move engine unavailable: {}", _0)]
    ServiceUnavailable(EngineError),

    /// Unsupported settings or start choice.
    #[display("Invalid configuration: {}", message)]
    InvalidConfiguration {
        /// What was wrong.
        message: String,
    },

    /// The channel failed.
    #[display("Channel error: {}", message)]
    Io {
        /// Description of the failure.
        message: String,
    },

    /// The local human input source failed.
    #[display("Input error: {}", message)]
    Input {
        /// Description of the failure.
        message: String,
    },
}

impl SessionError {
    /// True for rejections that re-prompt the same side.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::MalformedCoordinate(_) | SessionError::OccupiedCell { .. }
        )
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { waited } => SessionError::ProtocolTimeout { waited },
            TransportError::Io { message } => SessionError::Io { message },
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(err: ConfigError) -> Self {
        SessionError::InvalidConfiguration {
            message: err.message,
        }
    }
}

impl From<tictactoe_core::BoardError> for SessionError {
    fn from(err: tictactoe_core::BoardError) -> Self {
        SessionError::InvalidConfiguration {
            message: err.to_string(),
        }
    }
}
