//! Unified error type for the server crate.

use dealerd_engine::GameError;
use dealerd_protocol::ProtocolError;
use dealerd_storage::StorageError;

/// Top-level error that wraps the sub-crate errors plus raw I/O.
///
/// The `#[from]` attributes let handler code use `?` across layer
/// boundaries and still hand the caller one uniform type. How fatal an
/// error is depends on the variant: protocol and I/O errors end their
/// connection, game errors are reported to the client and the session
/// continues, storage errors are logged and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The byte stream was malformed. Fatal to that connection.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game operation was invalid. Recoverable; sent to the client.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Persisting a game record failed. Logged, never fatal.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A socket operation failed. Fatal to that connection (or, for
    /// the listener itself, to the server).
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err: ServerError = ProtocolError::BadMagic(0xDEAD_BEEF).into();
        assert!(matches!(err, ServerError::Protocol(_)));
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_from_game_error() {
        let err: ServerError = GameError::InvalidRounds(0).into();
        assert!(matches!(err, ServerError::Game(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "gone");
        let err: ServerError = io.into();
        assert!(matches!(err, ServerError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
