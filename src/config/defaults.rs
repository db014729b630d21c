//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Node Defaults
// =============================================================================

/// How long the dispatcher waits for a first line before assuming a client.
pub fn default_sniff_timeout_ms() -> u64 {
    100
}

pub fn default_sync_interval_ms() -> u64 {
    5_000
}

pub fn default_sync_connect_timeout_ms() -> u64 {
    2_000
}

pub fn default_sync_read_timeout_ms() -> u64 {
    3_000
}

pub fn default_push_connect_timeout_ms() -> u64 {
    1_000
}

/// Outbound lines buffered per session before deliveries to it are dropped.
pub fn default_session_queue() -> usize {
    256
}

pub fn default_max_line_len() -> usize {
    chatmesh_proto::line::DEFAULT_MAX_LINE_LEN
}

// =============================================================================
// Client Defaults
// =============================================================================

pub fn default_connect_timeout_ms() -> u64 {
    3_000
}

pub fn default_handshake_timeout_ms() -> u64 {
    5_000
}

pub fn default_retry_delay_ms() -> u64 {
    2_000
}
