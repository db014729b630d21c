//! Core configuration types and loading.

use chatmesh_proto::ServerDescriptor;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required argument <{0}>")]
    MissingArgument(&'static str),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
    #[error("invalid node name: must not be blank")]
    InvalidName,
    #[error("no valid servers were given")]
    NoServers,
}

/// Runtime knobs of a node. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerTuning {
    /// Milliseconds the dispatcher waits for a first line.
    pub sniff_timeout_ms: u64,
    /// Milliseconds between replication pull cycles.
    pub sync_interval_ms: u64,
    pub sync_connect_timeout_ms: u64,
    pub sync_read_timeout_ms: u64,
    pub push_connect_timeout_ms: u64,
    /// Milliseconds between `HEARTBEAT:` beacons. Absent disables them.
    pub heartbeat_interval_ms: Option<u64>,
    /// Outbound queue depth per session.
    pub session_queue: usize,
    /// Longest accepted line, in bytes.
    pub max_line_len: usize,
}

impl Default for ServerTuning {
    fn default() -> Self {
        Self {
            sniff_timeout_ms: default_sniff_timeout_ms(),
            sync_interval_ms: default_sync_interval_ms(),
            sync_connect_timeout_ms: default_sync_connect_timeout_ms(),
            sync_read_timeout_ms: default_sync_read_timeout_ms(),
            push_connect_timeout_ms: default_push_connect_timeout_ms(),
            heartbeat_interval_ms: None,
            session_queue: default_session_queue(),
            max_line_len: default_max_line_len(),
        }
    }
}

impl ServerTuning {
    pub fn sniff_timeout(&self) -> Duration {
        Duration::from_millis(self.sniff_timeout_ms)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms.max(1))
    }

    pub fn sync_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_connect_timeout_ms)
    }

    pub fn sync_read_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_read_timeout_ms)
    }

    pub fn push_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.push_connect_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Runtime knobs of the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientTuning {
    pub connect_timeout_ms: u64,
    /// Upper bound on reading the banner and prompt after connecting.
    pub handshake_timeout_ms: u64,
    /// Pause between failed connection attempts.
    pub retry_delay_ms: u64,
    pub max_line_len: usize,
}

impl Default for ClientTuning {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            max_line_len: default_max_line_len(),
        }
    }
}

impl ClientTuning {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Both tuning sets together. The binaries always run on the defaults;
/// embedders and tests may build one in code or parse it from TOML.
///
/// ```toml
/// [server]
/// sync_interval_ms = 2000
/// heartbeat_interval_ms = 3000
///
/// [client]
/// retry_delay_ms = 500
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub server: ServerTuning,
    pub client: ClientTuning,
}

impl Tuning {
    /// Parse tuning from TOML text. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Everything a node needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listening port (all interfaces).
    pub port: u16,
    /// Node name announced in the banner.
    pub name: String,
    /// Peers to push to and pull from.
    pub peers: Vec<ServerDescriptor>,
    pub tuning: ServerTuning,
}

/// Everything the client needs to start.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Candidate servers, in failover order.
    pub servers: Vec<ServerDescriptor>,
    pub tuning: ClientTuning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = ServerTuning::default();
        assert_eq!(t.sniff_timeout(), Duration::from_millis(100));
        assert_eq!(t.sync_interval(), Duration::from_secs(5));
        assert!(t.heartbeat_interval().is_none());

        let c = ClientTuning::default();
        assert_eq!(c.connect_timeout(), Duration::from_secs(3));
        assert_eq!(c.retry_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_tuning_keeps_defaults() {
        let tuning = Tuning::from_toml(
            "[server]\nsync_interval_ms = 250\nheartbeat_interval_ms = 3000\n\n[client]\nretry_delay_ms = 10",
        )
        .unwrap();
        assert_eq!(tuning.server.sync_interval(), Duration::from_millis(250));
        assert_eq!(
            tuning.server.heartbeat_interval(),
            Some(Duration::from_secs(3))
        );
        assert_eq!(tuning.server.sniff_timeout_ms, 100);
        assert_eq!(tuning.client.retry_delay(), Duration::from_millis(10));
        assert_eq!(tuning.client.connect_timeout_ms, 3_000);
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(matches!(
            Tuning::from_toml("[server]\nsync_interval_ms = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_zero_heartbeat_disables() {
        let t = ServerTuning {
            heartbeat_interval_ms: Some(0),
            ..ServerTuning::default()
        };
        assert!(t.heartbeat_interval().is_none());
    }
}
