//! Wire protocol for dealerd.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`Message`], [`Decision`], [`Outcome`]) — the closed set
//!   of messages that travel on the wire.
//! - **Codec** ([`encode`], [`decode`], [`payload_len`]) — the fixed-layout
//!   binary format those messages use.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during decoding.
//!
//! # Wire format
//!
//! Every message, UDP or TCP, is framed the same way:
//!
//! ```text
//! [4B magic cookie 0xABCDDCBA][1B type tag][fixed-size payload]
//! ```
//!
//! Multi-byte integers are big-endian. Payload size is fixed per type
//! tag, so a reader can frame a message with exactly two reads: the
//! 5-byte header, then `payload_len(tag)` payload bytes.
//!
//! The protocol layer holds no connection or game state — it only knows
//! how to turn [`Message`] values into bytes and back.

mod codec;
mod error;
mod types;

pub use codec::{HEADER_LEN, MAGIC_COOKIE, NAME_LEN, decode, encode, payload_len};
pub use error::ProtocolError;
pub use types::{Decision, GameErrorCode, Message, Outcome};
