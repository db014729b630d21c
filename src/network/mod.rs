//! Network module.
//!
//! Contains the Gateway (TCP listener), the role dispatcher, the client
//! session, inbound peer requests and the local broadcast fan-out.

mod broadcast;
mod connection;
mod dispatch;
mod gateway;
mod heartbeat;
mod peer;

pub use broadcast::BroadcastRouter;
pub use connection::{ClientSession, SessionPhase, validate_username};
pub use dispatch::{ConnectionRole, handle_connection, sniff_role};
pub use gateway::Gateway;
pub use heartbeat::run_heartbeat;
pub use peer::{serve_replicate, serve_sync_request};
