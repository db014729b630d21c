//! Line-based codec for tokio.
//!
//! This module provides a codec that reads/writes newline-terminated lines.
//! Decoded lines have their terminator (`\n` or `\r\n`) removed; encoded lines
//! get a single `\n` appended.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Default limit for interactive lines.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024 * 1024;

/// Line-based codec that handles newline-terminated messages.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with [`DEFAULT_MAX_LINE_LEN`].
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// Create a codec that accepts lines of any length. Peer exchanges use it:
    /// a `SYNC_DATA:` reply carries the whole history on one line.
    pub fn unbounded() -> Self {
        Self::with_max_len(usize::MAX)
    }

    fn to_line(raw: &[u8]) -> error::Result<String> {
        let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        String::from_utf8(raw.to_vec()).map_err(|e| error::ProtocolError::InvalidUtf8 {
            byte_pos: e.utf8_error().valid_up_to(),
            details: e.utf8_error().to_string(),
        })
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        // Look for newline starting from where we left off
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(error::ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            Self::to_line(&line).map(Some)
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(error::ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }
        // Peer closed after an unterminated final line.
        let rest = src.split_to(src.len());
        self.next_index = 0;
        Self::to_line(&rest).map(Some)
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> error::Result<()> {
        let line = line.as_ref();
        if line.len() >= self.max_len {
            return Err(error::ProtocolError::LineTooLong {
                actual: line.len() + 1,
                limit: self.max_len,
            });
        }
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
