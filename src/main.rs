//! chatmeshd - chat relay node.
//!
//! Relays chat lines between local clients and replicates them to peer nodes.

use chatmesh::config::{SERVER_USAGE, ServerConfig, ServerTuning};
use chatmesh::node;
use chatmesh::telemetry;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("info");

    let tuning = ServerTuning::default();
    let (config, rejected) = ServerConfig::from_args(std::env::args().skip(1), tuning)
        .map_err(|e| {
            error!(error = %e, "Invalid arguments");
            eprintln!("{SERVER_USAGE}");
            e
        })?;

    for e in &rejected {
        warn!(error = %e, "Ignoring malformed peer descriptor");
    }

    info!(
        node = %config.name,
        port = config.port,
        peers = config.peers.len(),
        "Starting chatmeshd"
    );

    let cancel = CancellationToken::new();
    let handle = node::start(config, cancel).await?;
    info!(addr = %handle.local_addr(), "Node listening");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    handle.shutdown().await;

    Ok(())
}
