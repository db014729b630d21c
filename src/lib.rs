//! chatmesh - a small replicated chat relay.
//!
//! Every node keeps the full chat history, relays lines between its local
//! clients, pushes new lines to its peers and periodically pulls their
//! history to repair gaps. The bundled client fails over between nodes.

pub mod client;
pub mod config;
pub mod error;
pub mod network;
pub mod node;
pub mod state;
pub mod sync;
pub mod telemetry;
