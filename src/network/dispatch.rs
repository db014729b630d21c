//! Role detection for accepted connections.
//!
//! Clients and peers share one listening port. Peers always open with a tagged
//! frame (`SYNC_REQUEST` or `REPLICATE:`); interactive clients wait for the
//! banner. The dispatcher reads at most one line with a short timeout:
//!
//! ```text
//!   first line            role
//!   ─────────────────     ─────────────────────────────────
//!   SYNC_REQUEST          PeerSyncRequest
//!   REPLICATE:<record>    PeerReplicateMessage(record)
//!   anything else         ClientConnection (line = username)
//!   nothing in time       ClientConnection (no username yet)
//!   read error / EOF      ClientConnection (no username yet)
//! ```
//!
//! Classification is by content only. The timeout never turns a connection
//! into a peer; it only bounds how long a silent client waits for its banner.

use chatmesh_proto::{LineCodec, MessageRecord, PeerFrame, REPLICATE_PREFIX};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::connection::ClientSession;
use super::peer;
use crate::state::Hub;

/// What a connection turned out to be. Decided once, never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionRole {
    /// An interactive client. `sniffed` is the line it already sent, which
    /// the handshake uses as the username.
    ClientConnection { sniffed: Option<String> },
    PeerSyncRequest,
    PeerReplicateMessage(MessageRecord),
}

impl ConnectionRole {
    /// Classify by the first line, if any.
    pub fn classify(first_line: Option<String>) -> Self {
        match first_line {
            None => Self::ClientConnection { sniffed: None },
            Some(line) => match PeerFrame::parse(&line) {
                Some(PeerFrame::SyncRequest) => Self::PeerSyncRequest,
                Some(PeerFrame::Replicate(record)) => Self::PeerReplicateMessage(record),
                None => Self::ClientConnection {
                    sniffed: Some(line),
                },
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ClientConnection { .. } => "client",
            Self::PeerSyncRequest => "peer_sync",
            Self::PeerReplicateMessage(_) => "peer_replicate",
        }
    }
}

/// Read at most one line within `wait` and classify the connection.
pub async fn sniff_role<S>(framed: &mut Framed<S, LineCodec>, wait: Duration) -> ConnectionRole
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let first_line = match timeout(wait, framed.next()).await {
        Err(_) => None,
        Ok(None) => None,
        Ok(Some(Err(e))) => {
            debug!(error = %e, "Read failed during role sniff, assuming client");
            None
        }
        Ok(Some(Ok(line))) => Some(line),
    };
    ConnectionRole::classify(first_line)
}

/// Drive one accepted connection to completion.
pub async fn handle_connection<S>(stream: S, hub: Arc<Hub>, cancel: CancellationToken)
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let limit = hub.tuning.max_line_len;
    // Room for the `REPLICATE:` tag in front of a record that fits the limit.
    let sniff_limit = limit.saturating_add(REPLICATE_PREFIX.len());
    let mut framed = Framed::new(stream, LineCodec::with_max_len(sniff_limit));
    let role = sniff_role(&mut framed, hub.tuning.sniff_timeout()).await;
    debug!(role = role.label(), "Connection role detected");

    match role {
        ConnectionRole::PeerSyncRequest => {
            if let Err(e) = peer::serve_sync_request(&mut framed, &hub).await {
                debug!(error = %e, "Failed to answer sync request");
            }
        }
        ConnectionRole::PeerReplicateMessage(record) => {
            peer::serve_replicate(&hub, record);
        }
        ConnectionRole::ClientConnection { sniffed } => {
            *framed.codec_mut() = LineCodec::with_max_len(limit);
            let session = ClientSession::new(framed, Arc::clone(&hub), sniffed);
            match session.run(cancel).await {
                Ok(()) => {}
                Err(e) if e.is_protocol_violation() => {
                    info!(code = e.error_code(), error = %e, "Client rejected");
                }
                Err(e) => {
                    warn!(code = e.error_code(), error = %e, "Client session ended with error");
                }
            }
        }
    }
}
