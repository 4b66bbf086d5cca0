//! Error types for the game engine.

use dealerd_protocol::GameErrorCode;

/// Errors raised by game-session operations.
///
/// These are recoverable at the connection level: the session handler
/// reports them to the client as a `GameError` packet and keeps the
/// session alive.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    /// The operation is not valid in the session's current phase.
    #[error("invalid state: cannot {operation} while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: &'static str,
    },

    /// A game was requested with zero rounds.
    #[error("invalid round count: {0} (must be at least 1)")]
    InvalidRounds(u8),

    /// No cards remained and no reshuffle was possible.
    #[error("deck exhausted")]
    DeckEmpty,
}

impl GameError {
    /// The wire error code the client sees for this error.
    pub fn wire_code(&self) -> GameErrorCode {
        match self {
            GameError::InvalidState { .. } | GameError::InvalidRounds(_) => {
                GameErrorCode::InvalidState
            }
            GameError::DeckEmpty => GameErrorCode::DeckEmpty,
        }
    }
}
