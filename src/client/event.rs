//! Notices the client emits for display.

use chatmesh_proto::ServerDescriptor;
use tokio::sync::mpsc;

pub type EventSender = mpsc::UnboundedSender<ClientEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ClientEvent>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// An attempt against `server` is starting.
    Connecting {
        server: ServerDescriptor,
        attempt: usize,
    },
    ConnectFailed {
        server: ServerDescriptor,
        reason: String,
    },
    /// First successful connection. `name` comes from the banner.
    Connected {
        server: ServerDescriptor,
        name: String,
    },
    /// The server asks for a username; the operator must answer.
    Prompt(String),
    /// A line from the server: history, chat records, join and leave notices.
    Message(String),
    ConnectionLost {
        name: String,
        reason: String,
    },
    /// Connected again after a drop, under the stored username.
    Reconnected {
        server: ServerDescriptor,
        name: String,
    },
    ServerList {
        servers: Vec<ServerDescriptor>,
        current: usize,
    },
    Help,
    /// An operator line that could not be written to any server.
    Undelivered(String),
    GaveUp {
        reason: String,
    },
    Disconnected,
}
