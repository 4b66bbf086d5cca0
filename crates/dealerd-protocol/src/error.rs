//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the byte stream itself is bad. That is
//! fatal to the connection that produced it: the session handler logs it
//! and closes, it never retries or resynchronizes mid-stream.

/// Errors that can occur while decoding a wire message.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The 4-byte magic cookie did not match `0xABCDDCBA`.
    #[error("bad magic cookie: {0:#010x}")]
    BadMagic(u32),

    /// The type tag is not one the protocol defines.
    #[error("unknown message type: {0:#04x}")]
    UnknownType(u8),

    /// Fewer bytes were available than the type's fixed layout demands.
    #[error("truncated message: need {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },

    /// The frame was well-formed but a field held an out-of-range value
    /// (e.g. a card rank index above 12, or an unassigned outcome byte).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
