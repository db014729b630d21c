//! Fan-out of lines to local client sessions.
//!
//! Each session has a bounded outbound queue drained by its own task. The
//! router only ever `try_send`s into those queues: a recipient whose queue is
//! full or closed loses that one line and the router moves on.

use chatmesh_proto::MessageRecord;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::state::{SessionId, SessionReceiver, SessionRegistry};

/// Delivers records to every registered session except an optional sender.
#[derive(Debug)]
pub struct BroadcastRouter {
    sessions: SessionRegistry,
}

impl BroadcastRouter {
    pub fn new(queue_depth: usize) -> Self {
        Self {
            sessions: SessionRegistry::new(queue_depth),
        }
    }

    pub fn register(&self, username: &str) -> (SessionId, SessionReceiver) {
        self.sessions.register(username)
    }

    pub fn unregister(&self, id: SessionId) {
        if let Some(handle) = self.sessions.unregister(id) {
            debug!(session = %id, username = %handle.username, "Session unregistered");
        }
    }

    /// Deliver `record` to all sessions but `exclude`. `None` excludes nobody,
    /// which is what peer-originated records use. Returns how many sessions
    /// the line was queued for.
    pub fn broadcast(&self, record: &MessageRecord, exclude: Option<SessionId>) -> usize {
        self.broadcast_line(Arc::from(record.as_str()), exclude)
    }

    /// Deliver a raw line that is not a chat record (e.g. a heartbeat).
    pub fn broadcast_line(&self, line: Arc<str>, exclude: Option<SessionId>) -> usize {
        let mut delivered = 0;
        for (id, tx) in self.sessions.recipients(exclude) {
            match tx.try_send(Arc::clone(&line)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(session = %id, "Session queue full, dropping line");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(session = %id, "Session closed before delivery");
                }
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
