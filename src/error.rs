//! Unified error handling for chatmesh.
//!
//! One enum per layer: client sessions on a node, outbound peer links, and the
//! interactive client. Configuration errors live in [`crate::config`].

use chatmesh_proto::{ProtocolError, ServerDescriptor};
use thiserror::Error;

// ============================================================================
// Session Errors (per accepted client connection)
// ============================================================================

/// Reasons a client session ends before or during the Active phase.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("client closed the connection during the handshake")]
    ClosedDuringHandshake,

    #[error("empty username")]
    EmptyUsername,

    #[error("username {0:?} collides with a peer frame")]
    ReservedUsername(String),

    #[error("transport error: {0}")]
    Transport(#[from] ProtocolError),
}

impl SessionError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ClosedDuringHandshake => "closed_during_handshake",
            Self::EmptyUsername => "empty_username",
            Self::ReservedUsername(_) => "reserved_username",
            Self::Transport(_) => "transport",
        }
    }

    /// Protocol violations close the connection without any broadcast.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::EmptyUsername | Self::ReservedUsername(_))
    }
}

// ============================================================================
// Peer Errors (outbound replication links)
// ============================================================================

/// Failures talking to one peer. Never surfaced beyond a debug log: the
/// replication loops skip the peer and carry on.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("connect to {peer} timed out")]
    ConnectTimeout { peer: ServerDescriptor },

    #[error("connect to {peer} failed: {source}")]
    Connect {
        peer: ServerDescriptor,
        #[source]
        source: std::io::Error,
    },

    #[error("no reply from {peer} in time")]
    ReadTimeout { peer: ServerDescriptor },

    #[error("{peer} closed the link without replying")]
    Closed { peer: ServerDescriptor },

    #[error("protocol error with {peer}: {source}")]
    Protocol {
        peer: ServerDescriptor,
        #[source]
        source: ProtocolError,
    },
}

impl PeerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectTimeout { .. } => "connect_timeout",
            Self::Connect { .. } => "connect_failed",
            Self::ReadTimeout { .. } => "read_timeout",
            Self::Closed { .. } => "closed",
            Self::Protocol { .. } => "protocol",
        }
    }
}

// ============================================================================
// Client Errors (interactive failover client)
// ============================================================================

/// Errors of the interactive client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connect timed out")]
    ConnectTimeout,

    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("server did not finish the handshake in time")]
    HandshakeTimeout,

    #[error("server closed the connection during the handshake")]
    HandshakeClosed,

    #[error("transport error: {0}")]
    Transport(#[from] ProtocolError),

    #[error("no username was provided")]
    NoUsername,

    #[error("no server reachable after {attempts} attempts")]
    Exhausted { attempts: usize },

    #[error("client shut down")]
    Cancelled,
}

impl ClientError {
    /// Whether trying the next candidate can help. Operator-side failures
    /// (no username) cannot be fixed by another server.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::NoUsername | Self::Exhausted { .. } | Self::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let peer = ServerDescriptor::new("localhost", 5001);
        assert_eq!(
            PeerError::ReadTimeout { peer: peer.clone() }.error_code(),
            "read_timeout"
        );
        assert_eq!(PeerError::Closed { peer }.error_code(), "closed");
        assert_eq!(SessionError::EmptyUsername.error_code(), "empty_username");
    }

    #[test]
    fn test_protocol_violations() {
        assert!(SessionError::EmptyUsername.is_protocol_violation());
        assert!(SessionError::ReservedUsername("SYNC_REQUEST".into()).is_protocol_violation());
        assert!(!SessionError::ClosedDuringHandshake.is_protocol_violation());
    }

    #[test]
    fn test_client_retryable() {
        assert!(ClientError::ConnectTimeout.is_retryable());
        assert!(ClientError::HandshakeClosed.is_retryable());
        assert!(!ClientError::NoUsername.is_retryable());
        assert!(!ClientError::Exhausted { attempts: 4 }.is_retryable());
    }

    #[test]
    fn test_peer_error_display() {
        let err = PeerError::ConnectTimeout {
            peer: ServerDescriptor::new("10.0.0.9", 5002),
        };
        assert_eq!(err.to_string(), "connect to 10.0.0.9:5002 timed out");
    }
}
