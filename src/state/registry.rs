//! Registry of active client sessions.
//!
//! `DashMap::iter()` holds shard locks for the lifetime of its guards, so
//! readers clone what they need into a `Vec` and drop the guards before doing
//! anything else with it.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::uid::{SessionId, SessionIdGenerator};

/// Outbound line queue of one session.
pub type SessionSender = mpsc::Sender<Arc<str>>;
pub type SessionReceiver = mpsc::Receiver<Arc<str>>;

/// What the node knows about a registered session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub username: String,
    pub tx: SessionSender,
}

/// All sessions that completed the handshake and have not closed yet.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionHandle>,
    ids: SessionIdGenerator,
    queue_depth: usize,
}

impl SessionRegistry {
    pub fn new(queue_depth: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            ids: SessionIdGenerator::new(),
            queue_depth: queue_depth.max(1),
        }
    }

    /// Register a session and hand back its id and outbound queue.
    pub fn register(&self, username: &str) -> (SessionId, SessionReceiver) {
        let (tx, rx) = mpsc::channel(self.queue_depth);
        let id = self.ids.next();
        self.sessions.insert(
            id,
            SessionHandle {
                username: username.to_string(),
                tx,
            },
        );
        (id, rx)
    }

    pub fn unregister(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.remove(&id).map(|(_, handle)| handle)
    }

    /// Senders of every session except `exclude`, cloned out of the map.
    pub fn recipients(&self, exclude: Option<SessionId>) -> Vec<(SessionId, SessionSender)> {
        self.sessions
            .iter()
            .filter(|entry| Some(*entry.key()) != exclude)
            .map(|entry| (*entry.key(), entry.value().tx.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
