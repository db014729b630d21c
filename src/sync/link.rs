//! Short-lived outbound connection to one peer.

use chatmesh_proto::{LineCodec, MessageRecord, PeerFrame, ServerDescriptor, SyncData};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

use crate::error::PeerError;

/// A line-framed connection to a peer, opened for one exchange. Lines are not
/// length-limited: a sync reply grows with the peer's history.
pub struct PeerLink {
    peer: ServerDescriptor,
    framed: Framed<TcpStream, LineCodec>,
}

impl PeerLink {
    /// Connect within `connect_timeout`.
    pub async fn connect(
        peer: &ServerDescriptor,
        connect_timeout: Duration,
    ) -> Result<Self, PeerError> {
        let stream = timeout(
            connect_timeout,
            TcpStream::connect((peer.host.as_str(), peer.port)),
        )
        .await
        .map_err(|_| PeerError::ConnectTimeout { peer: peer.clone() })?
        .map_err(|source| PeerError::Connect {
            peer: peer.clone(),
            source,
        })?;

        Ok(Self {
            peer: peer.clone(),
            framed: Framed::new(stream, LineCodec::unbounded()),
        })
    }

    pub async fn send(&mut self, frame: &PeerFrame) -> Result<(), PeerError> {
        self.framed
            .send(frame.to_string())
            .await
            .map_err(|source| PeerError::Protocol {
                peer: self.peer.clone(),
                source,
            })
    }

    /// Read one line within `read_timeout`.
    pub async fn recv(&mut self, read_timeout: Duration) -> Result<String, PeerError> {
        match timeout(read_timeout, self.framed.next()).await {
            Err(_) => Err(PeerError::ReadTimeout {
                peer: self.peer.clone(),
            }),
            Ok(None) => Err(PeerError::Closed {
                peer: self.peer.clone(),
            }),
            Ok(Some(Err(source))) => Err(PeerError::Protocol {
                peer: self.peer.clone(),
                source,
            }),
            Ok(Some(Ok(line))) => Ok(line),
        }
    }

    /// Send `REPLICATE:<record>` and close without waiting for anything.
    pub async fn push(mut self, record: &MessageRecord) -> Result<(), PeerError> {
        self.send(&PeerFrame::Replicate(record.clone())).await?;
        self.close().await;
        Ok(())
    }

    /// Send `SYNC_REQUEST`, read the `SYNC_DATA:` reply and decode it.
    pub async fn pull(mut self, read_timeout: Duration) -> Result<Vec<MessageRecord>, PeerError> {
        self.send(&PeerFrame::SyncRequest).await?;
        let line = self.recv(read_timeout).await?;
        let data = SyncData::parse(&line).map_err(|source| PeerError::Protocol {
            peer: self.peer.clone(),
            source,
        })?;
        self.close().await;
        Ok(data.into_records())
    }

    async fn close(mut self) {
        // Best effort; the peer treats EOF as the end of the exchange.
        let _ = SinkExt::<String>::close(&mut self.framed).await;
    }
}
