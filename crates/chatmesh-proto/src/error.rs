//! Error types for the chatmesh protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Protocol-level errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O failure on the underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the codec's limit.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Bytes buffered so far.
        actual: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// A line was not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
        /// Decoder message.
        details: String,
    },

    /// A `host:port` descriptor could not be parsed.
    #[error("invalid server descriptor {input:?}: {reason}")]
    InvalidDescriptor {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A reply to `SYNC_REQUEST` did not carry the `SYNC_DATA:` prefix.
    #[error("malformed sync response")]
    MalformedSyncData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err: ProtocolError = io_err.into();
        assert!(matches!(err, ProtocolError::Io(_)));
        assert_eq!(err.to_string(), "io error: connection refused");
    }

    #[test]
    fn test_descriptor_error_display() {
        let err = ProtocolError::InvalidDescriptor {
            input: "nohost".to_string(),
            reason: "missing port",
        };
        assert_eq!(
            err.to_string(),
            "invalid server descriptor \"nohost\": missing port"
        );
    }
}
