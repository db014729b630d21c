//! The Hub - central shared state of one node.
//!
//! Holds the message log, the session registry (behind the broadcast router)
//! and the outbound replication push, all reachable from any task through an
//! `Arc<Hub>`.

use chatmesh_proto::MessageRecord;

use crate::config::{ServerConfig, ServerTuning};
use crate::network::BroadcastRouter;
use crate::state::{MessageLog, SessionId};
use crate::sync::ReplicationPush;

/// This node's identity.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    /// Name announced in the `SERVIDOR:` banner.
    pub name: String,
}

pub struct Hub {
    pub info: NodeInfo,
    pub log: MessageLog,
    pub router: BroadcastRouter,
    pub replicator: ReplicationPush,
    pub tuning: ServerTuning,
}

impl Hub {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            info: NodeInfo {
                name: config.name.clone(),
            },
            log: MessageLog::new(),
            router: BroadcastRouter::new(config.tuning.session_queue),
            replicator: ReplicationPush::new(config.peers.clone(), config.tuning.clone()),
            tuning: config.tuning.clone(),
        }
    }

    /// Record a locally originated event: append it, show it to every other
    /// session and push it to the peers.
    pub fn publish_local(&self, record: MessageRecord, origin: SessionId) {
        self.log.append(record.clone());
        self.router.broadcast(&record, Some(origin));
        self.replicator.push_to_all(&record);
    }

    /// Accept a record pushed by a peer. Known records are ignored; new ones
    /// are appended and shown to every local session, never re-pushed.
    /// Returns whether the record was new.
    pub fn accept_replicated(&self, record: MessageRecord) -> bool {
        if !self.log.append_if_absent(record.clone()) {
            return false;
        }
        self.router.broadcast(&record, None);
        true
    }
}
