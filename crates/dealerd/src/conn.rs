//! Framed message I/O over one TCP connection.
//!
//! The fixed-layout protocol makes framing a two-step read: the 5-byte
//! header names the type, the type names the payload size. The
//! connection also counts bytes in each direction — those totals end
//! up in the session's stored game record.

use dealerd_protocol::{
    HEADER_LEN, MAGIC_COOKIE, Message, ProtocolError, decode, encode,
    payload_len,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::ServerError;

/// A TCP stream that reads and writes whole protocol messages.
pub(crate) struct FramedConn {
    stream: TcpStream,
    bytes_sent: u64,
    bytes_received: u64,
}

impl FramedConn {
    pub(crate) fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    /// Reads one framed message.
    ///
    /// Returns `Ok(None)` when the peer closed the connection cleanly
    /// (EOF on a frame boundary). EOF mid-frame is a truncated frame
    /// and surfaces as a protocol error.
    pub(crate) async fn read_message(
        &mut self,
    ) -> Result<Option<Message>, ServerError> {
        let mut header = [0u8; HEADER_LEN];

        // First read separately so a clean close is distinguishable
        // from a frame cut short.
        let n = self.stream.read(&mut header).await?;
        if n == 0 {
            return Ok(None);
        }
        if n < HEADER_LEN {
            self.stream
                .read_exact(&mut header[n..])
                .await
                .map_err(|e| eof_as_truncated(e, HEADER_LEN, n))?;
        }
        self.bytes_received += HEADER_LEN as u64;

        // Validate the header before trusting its payload size.
        let magic = u32::from_be_bytes([
            header[0], header[1], header[2], header[3],
        ]);
        if magic != MAGIC_COOKIE {
            return Err(ProtocolError::BadMagic(magic).into());
        }
        let tag = header[4];
        let payload_size = payload_len(tag)
            .ok_or(ProtocolError::UnknownType(tag))?;

        let mut frame = vec![0u8; HEADER_LEN + payload_size];
        frame[..HEADER_LEN].copy_from_slice(&header);
        self.stream
            .read_exact(&mut frame[HEADER_LEN..])
            .await
            .map_err(|e| {
                eof_as_truncated(e, HEADER_LEN + payload_size, HEADER_LEN)
            })?;
        self.bytes_received += payload_size as u64;

        Ok(Some(decode(&frame)?))
    }

    /// Encodes and writes one message.
    pub(crate) async fn send(&mut self, msg: &Message) -> Result<(), ServerError> {
        let bytes = encode(msg);
        self.stream.write_all(&bytes).await?;
        self.bytes_sent += bytes.len() as u64;
        Ok(())
    }

    /// Bytes written to the peer so far.
    pub(crate) fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Bytes read from the peer so far.
    pub(crate) fn bytes_received(&self) -> u64 {
        self.bytes_received
    }
}

/// Maps an EOF in the middle of a frame to `ProtocolError::Truncated`;
/// other I/O errors pass through.
fn eof_as_truncated(
    err: std::io::Error,
    needed: usize,
    have: usize,
) -> ServerError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        ProtocolError::Truncated { needed, have }.into()
    } else {
        err.into()
    }
}
