//! Sync Module - Node-to-Node Replication.
//!
//! Two complementary mechanisms keep message logs loosely in step:
//! an immediate unacknowledged push of every new local record, and a periodic
//! full-history pull that repairs anything a push missed. Both are
//! at-least-once and unordered; the exact-text membership test on the log
//! makes them idempotent.

pub mod link;
pub mod manager;
pub mod push;

pub use link::PeerLink;
pub use manager::{ReplicationSync, SyncReport};
pub use push::ReplicationPush;
