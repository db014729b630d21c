//! Inbound peer requests. Each connection carries exactly one request.

use chatmesh_proto::{LineCodec, MessageRecord, ProtocolError, SyncData};
use futures_util::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::debug;

use crate::state::Hub;

/// Answer `SYNC_REQUEST` with the whole log as one `SYNC_DATA:` line.
pub async fn serve_sync_request<S>(
    framed: &mut Framed<S, LineCodec>,
    hub: &Hub,
) -> Result<(), ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let snapshot = hub.log.snapshot();
    debug!(records = snapshot.len(), "Serving sync request");
    // The reply is one line holding the whole history.
    *framed.codec_mut() = LineCodec::unbounded();
    framed.send(SyncData::encode(&snapshot)).await
}

/// Apply `REPLICATE:<record>`. Returns whether the record was new.
pub fn serve_replicate(hub: &Hub, record: MessageRecord) -> bool {
    let text = record.as_str().to_string();
    let fresh = hub.accept_replicated(record);
    debug!(record = %text, fresh, "Replicated record received");
    fresh
}
