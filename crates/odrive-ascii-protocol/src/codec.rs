//! Line-based codec for the ASCII protocol.
//!
//! Every request and every reply is a single line terminated with `\n`.
//! There is no escaping and no length prefix.

use bytes::BytesMut;

/// Line terminator used in both directions.
pub const TERMINATOR: u8 = b'\n';

/// Longest line the codec will buffer before discarding the partial line.
pub const MAX_LINE_LENGTH: usize = 256;

/// A codec for splitting a byte stream into protocol lines.
///
/// Bytes are accumulated until a `\n` is seen; each complete line is returned
/// without its terminator. A trailing `\r` is dropped as well, since hosts on
/// some platforms send CRLF.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(MAX_LINE_LENGTH),
        }
    }

    /// Add received data to the buffer.
    ///
    /// If the buffer grows past [`MAX_LINE_LENGTH`] without a terminator the
    /// unterminated prefix is dropped.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        if self.buffer.len() > MAX_LINE_LENGTH && !self.buffer.contains(&TERMINATOR) {
            self.buffer.clear();
        }
    }

    /// Try to decode a complete line from the buffer.
    ///
    /// Empty lines are returned as empty strings; the device answers them
    /// with nothing, but callers may want to see them.
    pub fn decode_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| b == TERMINATOR)?;
        let line = self.buffer.split_to(end);
        let _ = self.buffer.split_to(1);

        let line = match line.last() {
            Some(b'\r') => &line[..line.len() - 1],
            _ => &line[..],
        };
        Some(String::from_utf8_lossy(line).into_owned())
    }

    /// Encode a command for transmission.
    ///
    /// Appends the `\n` terminator.
    pub fn encode_command(cmd: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(cmd.len() + 1);
        buf.extend_from_slice(cmd.as_bytes());
        buf.push(TERMINATOR);
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
