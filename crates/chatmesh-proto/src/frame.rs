//! Protocol frames.
//!
//! All literals below are fixed by the wire protocol shared with existing
//! clients and nodes.

use std::fmt;

use crate::error::ProtocolError;
use crate::record::MessageRecord;

/// Pull request sent by a syncing peer.
pub const SYNC_REQUEST: &str = "SYNC_REQUEST";
/// Prefix of the full-history reply.
pub const SYNC_DATA_PREFIX: &str = "SYNC_DATA:";
/// Prefix of a single-record push.
pub const REPLICATE_PREFIX: &str = "REPLICATE:";
/// Prefix of the optional liveness beacon.
pub const HEARTBEAT_PREFIX: &str = "HEARTBEAT:";
/// Prefix of the banner identifying a node to a client.
pub const BANNER_PREFIX: &str = "SERVIDOR:";
/// Username prompt sent after the banner.
pub const USERNAME_PROMPT: &str = "Ingresa tu nombre de usuario:";
/// Opens the history replay.
pub const HISTORY_START: &str = "--- Historial de mensajes ---";
/// Closes the history replay.
pub const HISTORY_END: &str = "--- Fin del historial ---";
/// Separator between records inside `SYNC_DATA:`.
pub const RECORD_SEPARATOR: &str = "||";

/// A frame that opens a peer-to-peer connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerFrame {
    /// `SYNC_REQUEST`
    SyncRequest,
    /// `REPLICATE:<record>`
    Replicate(MessageRecord),
}

impl PeerFrame {
    /// Classify a first line. Returns `None` for anything that is not a peer
    /// frame; such lines belong to interactive clients.
    pub fn parse(line: &str) -> Option<Self> {
        if line == SYNC_REQUEST {
            Some(Self::SyncRequest)
        } else {
            line.strip_prefix(REPLICATE_PREFIX)
                .map(|rest| Self::Replicate(MessageRecord::new(rest)))
        }
    }

    /// Whether `line` would be classified as a peer frame.
    pub fn is_peer_frame(line: &str) -> bool {
        line == SYNC_REQUEST || line.starts_with(REPLICATE_PREFIX)
    }
}

impl fmt::Display for PeerFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyncRequest => f.write_str(SYNC_REQUEST),
            Self::Replicate(record) => write!(f, "{REPLICATE_PREFIX}{record}"),
        }
    }
}

/// Full-history reply: `SYNC_DATA:<r1>||<r2>||...`
///
/// Each record is followed by the separator, so a non-empty payload always
/// ends in `||`. Decoding tolerates both forms and drops empty pieces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncData(pub Vec<MessageRecord>);

impl SyncData {
    /// Encode a sequence of records into a reply line.
    pub fn encode<'a, I>(records: I) -> String
    where
        I: IntoIterator<Item = &'a MessageRecord>,
    {
        let mut line = String::from(SYNC_DATA_PREFIX);
        for record in records {
            line.push_str(record.as_str());
            line.push_str(RECORD_SEPARATOR);
        }
        line
    }

    /// Decode a reply line.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let payload = line
            .strip_prefix(SYNC_DATA_PREFIX)
            .ok_or(ProtocolError::MalformedSyncData)?;
        Ok(Self(
            payload
                .split(RECORD_SEPARATOR)
                .filter(|piece| !piece.is_empty())
                .map(MessageRecord::new)
                .collect(),
        ))
    }

    /// The decoded records, in payload order.
    pub fn into_records(self) -> Vec<MessageRecord> {
        self.0
    }
}

impl fmt::Display for SyncData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::encode(&self.0))
    }
}

/// A line as seen by a client after connecting to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerLine<'a> {
    /// `SERVIDOR:<name>`
    Banner(&'a str),
    /// `HEARTBEAT:<name>`
    Heartbeat(&'a str),
    /// Anything else: prompts, history markers and chat records.
    Text(&'a str),
}

impl<'a> ServerLine<'a> {
    /// Classify a received line.
    pub fn classify(line: &'a str) -> Self {
        if let Some(name) = line.strip_prefix(BANNER_PREFIX) {
            Self::Banner(name)
        } else if let Some(name) = line.strip_prefix(HEARTBEAT_PREFIX) {
            Self::Heartbeat(name)
        } else {
            Self::Text(line)
        }
    }
}

/// `SERVIDOR:<name>`
pub fn banner(name: &str) -> String {
    format!("{BANNER_PREFIX}{name}")
}

/// `HEARTBEAT:<name>`
pub fn heartbeat(name: &str) -> String {
    format!("{HEARTBEAT_PREFIX}{name}")
}

/// Lines a session ignores instead of turning them into chat records.
pub fn is_control_line(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with(HEARTBEAT_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_frame_parse() {
        assert_eq!(PeerFrame::parse("SYNC_REQUEST"), Some(PeerFrame::SyncRequest));
        assert_eq!(
            PeerFrame::parse("REPLICATE:ana: hola"),
            Some(PeerFrame::Replicate(MessageRecord::new("ana: hola")))
        );
        assert_eq!(PeerFrame::parse("SYNC_REQUEST "), None);
        assert_eq!(PeerFrame::parse("ana"), None);
    }

    #[test]
    fn test_replicate_keeps_text_verbatim() {
        let frame = PeerFrame::parse("REPLICATE:  spaced: REPLICATE:x").unwrap();
        assert_eq!(
            frame,
            PeerFrame::Replicate(MessageRecord::new("  spaced: REPLICATE:x"))
        );
    }

    #[test]
    fn test_sync_data_encode() {
        let records = vec![MessageRecord::new("a"), MessageRecord::new("b")];
        assert_eq!(SyncData::encode(&records), "SYNC_DATA:a||b||");
        assert_eq!(SyncData::encode(std::iter::empty()), "SYNC_DATA:");
    }

    #[test]
    fn test_sync_data_parse_tolerates_separators() {
        let parsed = SyncData::parse("SYNC_DATA:a||b").unwrap();
        assert_eq!(parsed.0, vec![MessageRecord::new("a"), MessageRecord::new("b")]);

        let parsed = SyncData::parse("SYNC_DATA:a||||b||").unwrap();
        assert_eq!(parsed.0.len(), 2);

        assert!(SyncData::parse("SYNC_DATA:").unwrap().0.is_empty());
        assert!(SyncData::parse("HELLO").is_err());
    }

    #[test]
    fn test_server_line_classify() {
        assert_eq!(ServerLine::classify("SERVIDOR:n1"), ServerLine::Banner("n1"));
        assert_eq!(ServerLine::classify("HEARTBEAT:n1"), ServerLine::Heartbeat("n1"));
        assert_eq!(ServerLine::classify("ana: hola"), ServerLine::Text("ana: hola"));
    }

    #[test]
    fn test_control_lines() {
        assert!(is_control_line(""));
        assert!(is_control_line("   "));
        assert!(is_control_line("HEARTBEAT:n1"));
        assert!(!is_control_line("hola"));
    }
}
