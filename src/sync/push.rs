//! Fire-and-forget dissemination of new records.
//!
//! Every peer gets its own task, so an unreachable peer only ever delays
//! itself. No acknowledgement is read and nothing is retried; the periodic
//! pull in [`super::ReplicationSync`] repairs whatever a push loses.

use chatmesh_proto::{MessageRecord, ServerDescriptor};
use std::sync::Arc;
use tracing::{Instrument, debug};

use super::link::PeerLink;
use crate::config::ServerTuning;
use crate::telemetry::spans;

#[derive(Debug, Clone)]
pub struct ReplicationPush {
    peers: Arc<[ServerDescriptor]>,
    tuning: ServerTuning,
}

impl ReplicationPush {
    pub fn new(peers: Vec<ServerDescriptor>, tuning: ServerTuning) -> Self {
        Self {
            peers: peers.into(),
            tuning,
        }
    }

    pub fn peers(&self) -> &[ServerDescriptor] {
        &self.peers
    }

    /// Send `REPLICATE:<record>` to every peer concurrently. Returns at once.
    pub fn push_to_all(&self, record: &MessageRecord) {
        for peer in self.peers.iter() {
            let peer = peer.clone();
            let record = record.clone();
            let connect_timeout = self.tuning.push_connect_timeout();
            let span = spans::peer(&peer.to_string(), "push");

            tokio::spawn(
                async move {
                    let result = match PeerLink::connect(&peer, connect_timeout).await {
                        Ok(link) => link.push(&record).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = result {
                        debug!(code = e.error_code(), error = %e, "Push skipped");
                    }
                }
                .instrument(span),
            );
        }
    }
}
