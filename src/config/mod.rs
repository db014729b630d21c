//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: config structs and tunables
//! - [`args`]: positional CLI parsing for the node and the client
//! - [`defaults`]: serde default functions

mod args;
mod defaults;
mod types;

pub use args::{CLIENT_USAGE, SERVER_USAGE};
pub use types::{ClientConfig, ClientTuning, ConfigError, ServerConfig, ServerTuning, Tuning};
