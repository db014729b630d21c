//! The node's message log.
//!
//! Append-only and order-preserving. Readers take a snapshot under the read
//! lock and iterate it after the lock is released, so a slow reader (history
//! replay, sync reply) never holds up writers.

use chatmesh_proto::MessageRecord;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<MessageRecord>,
    /// Exact-text membership index over `records`.
    index: HashSet<MessageRecord>,
}

/// Append-only, ordered store of chat records.
#[derive(Debug, Default)]
pub struct MessageLog {
    inner: RwLock<Inner>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unconditionally. Two users sending the same text produce two
    /// entries here; only replication paths deduplicate.
    pub fn append(&self, record: MessageRecord) {
        let mut inner = self.inner.write();
        inner.index.insert(record.clone());
        inner.records.push(record);
    }

    /// Append only when no record with the same text exists. The check and the
    /// append happen under one write lock. Returns whether it was appended.
    pub fn append_if_absent(&self, record: MessageRecord) -> bool {
        let mut inner = self.inner.write();
        if inner.index.contains(&record) {
            return false;
        }
        inner.index.insert(record.clone());
        inner.records.push(record);
        true
    }

    pub fn contains_exact(&self, text: &str) -> bool {
        self.inner.read().index.contains(text)
    }

    /// Point-in-time copy in append order.
    pub fn snapshot(&self) -> Vec<MessageRecord> {
        self.inner.read().records.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries whose text equals `text`.
    pub fn count_exact(&self, text: &str) -> usize {
        self.inner
            .read()
            .records
            .iter()
            .filter(|r| r.as_str() == text)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_append_preserves_order() {
        let log = MessageLog::new();
        log.append(MessageRecord::joined("ana"));
        log.append(MessageRecord::chat("ana", "hola"));
        log.append(MessageRecord::left("ana"));

        let snap: Vec<String> = log.snapshot().into_iter().map(|r| r.into_string()).collect();
        assert_eq!(
            snap,
            vec!["ana se unió al chat", "ana: hola", "ana salió del chat"]
        );
    }

    #[test]
    fn test_append_does_not_dedupe() {
        let log = MessageLog::new();
        log.append(MessageRecord::chat("ana", "hola"));
        log.append(MessageRecord::chat("ana", "hola"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.count_exact("ana: hola"), 2);
    }

    #[test]
    fn test_append_if_absent() {
        let log = MessageLog::new();
        assert!(log.append_if_absent(MessageRecord::new("x")));
        assert!(!log.append_if_absent(MessageRecord::new("x")));
        assert!(log.contains_exact("x"));
        assert!(!log.contains_exact("y"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_snapshot_is_stable_while_appending() {
        let log = MessageLog::new();
        log.append(MessageRecord::new("a"));
        let snap = log.snapshot();
        log.append(MessageRecord::new("b"));
        assert_eq!(snap.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_concurrent_append_if_absent_keeps_one() {
        let log = Arc::new(MessageLog::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || log.append_if_absent(MessageRecord::new("dup")))
            })
            .collect();
        let inserted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|appended| *appended)
            .count();
        assert_eq!(inserted, 1);
        assert_eq!(log.len(), 1);
    }
}
