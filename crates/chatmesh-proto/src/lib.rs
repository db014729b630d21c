//! # chatmesh-proto
//!
//! Wire vocabulary for the chatmesh relay cluster.
//!
//! Every connection speaks newline-terminated text. Clients and nodes exchange
//! a banner, a username prompt, a history replay and chat records; nodes talk
//! to each other with three peer frames (`SYNC_REQUEST`, `SYNC_DATA:` and
//! `REPLICATE:`).
//!
//! ## Features
//!
//! - [`MessageRecord`]: the opaque chat line stored in every node's log
//! - [`PeerFrame`] and [`SyncData`]: peer-to-peer frames
//! - [`ServerLine`]: classification of lines a client receives
//! - [`ServerDescriptor`]: `host:port` parsing
//! - [`LineCodec`]: tokio codec for the line transport (feature `tokio`)
//!
//! ## Quick Start
//!
//! ```rust
//! use chatmesh_proto::{MessageRecord, PeerFrame};
//!
//! let record = MessageRecord::chat("ana", "hola");
//! let frame = PeerFrame::Replicate(record.clone());
//! assert_eq!(frame.to_string(), "REPLICATE:ana: hola");
//! assert_eq!(PeerFrame::parse(&frame.to_string()), Some(frame));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod frame;
#[cfg(feature = "tokio")]
pub mod line;
pub mod record;

pub use self::descriptor::ServerDescriptor;
pub use self::error::ProtocolError;
pub use self::frame::{
    BANNER_PREFIX, HEARTBEAT_PREFIX, HISTORY_END, HISTORY_START, PeerFrame, REPLICATE_PREFIX,
    RECORD_SEPARATOR, SYNC_DATA_PREFIX, SYNC_REQUEST, ServerLine, SyncData, USERNAME_PROMPT,
    banner, heartbeat, is_control_line,
};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::record::MessageRecord;
