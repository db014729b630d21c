//! Chat records.
//!
//! A record is the literal text of one chat event. It carries no id and no
//! timestamp: two records are the same record when their text is equal, and
//! that equality is what every node deduplicates on.

use std::borrow::Borrow;
use std::fmt;

/// Suffix of the record announcing that a user joined.
pub const JOINED_SUFFIX: &str = " se unió al chat";

/// Suffix of the record announcing that a user left.
pub const LEFT_SUFFIX: &str = " salió del chat";

/// One chat line as stored in a node's log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageRecord(String);

impl MessageRecord {
    /// Wrap text received verbatim (from a peer or a sync payload).
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// `"<user>: <text>"`
    pub fn chat(user: &str, text: &str) -> Self {
        Self(format!("{user}: {text}"))
    }

    /// `"<user> se unió al chat"`
    pub fn joined(user: &str) -> Self {
        Self(format!("{user}{JOINED_SUFFIX}"))
    }

    /// `"<user> salió del chat"`
    pub fn left(user: &str) -> Self {
        Self(format!("{user}{LEFT_SUFFIX}"))
    }

    /// The record text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the record text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MessageRecord {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageRecord {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for MessageRecord {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}
