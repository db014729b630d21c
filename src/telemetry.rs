//! Tracing setup and span constructors.

use tracing_subscriber::EnvFilter;

/// Set to `json` for one JSON object per log line.
pub const LOG_FORMAT_ENV: &str = "CHATMESH_LOG_FORMAT";

/// Install the global fmt subscriber on stderr. `RUST_LOG` overrides
/// `default_filter`.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for an accepted connection, before its role is known.
    pub fn connection(addr: &str) -> Span {
        info_span!("connection", addr = %addr)
    }

    /// Span for one outbound exchange with a peer.
    pub fn peer(peer: &str, op: &'static str) -> Span {
        info_span!("peer", peer = %peer, op)
    }

    /// Span for the interactive client's current server.
    pub fn server(server: &str) -> Span {
        info_span!("server", server = %server)
    }
}
