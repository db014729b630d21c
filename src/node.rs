//! Node startup and shutdown.
//!
//! A running node is three long-lived tasks sharing one `Hub`: the gateway
//! accept loop, the periodic replication pull and, when enabled, the
//! heartbeat. Per-connection tasks hang off the gateway's cancellation token.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::network::{Gateway, run_heartbeat};
use crate::state::Hub;
use crate::sync::ReplicationSync;

/// Handle to a running node.
pub struct NodeHandle {
    addr: SocketAddr,
    hub: Arc<Hub>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Bind `0.0.0.0:<port>` and start the node.
pub async fn start(config: ServerConfig, cancel: CancellationToken) -> anyhow::Result<NodeHandle> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = TcpListener::bind(addr).await?;
    start_with_listener(listener, config, cancel)
}

/// Start the node on an already bound listener.
pub fn start_with_listener(
    listener: TcpListener,
    config: ServerConfig,
    cancel: CancellationToken,
) -> anyhow::Result<NodeHandle> {
    let hub = Arc::new(Hub::new(&config));
    let gateway = Gateway::from_listener(listener, Arc::clone(&hub));
    let addr = gateway.local_addr()?;

    info!(
        node = %config.name,
        %addr,
        peers = config.peers.len(),
        "Starting chatmesh node"
    );

    let mut tasks = Vec::with_capacity(3);

    let gateway_cancel = cancel.clone();
    tasks.push(tokio::spawn(async move {
        if let Err(e) = gateway.run(gateway_cancel).await {
            error!(error = %e, "Gateway error");
        }
    }));

    tasks.push(tokio::spawn(
        ReplicationSync::new(Arc::clone(&hub)).run(cancel.clone()),
    ));

    if let Some(period) = config.tuning.heartbeat_interval() {
        tasks.push(tokio::spawn(run_heartbeat(
            Arc::clone(&hub),
            period,
            cancel.clone(),
        )));
    }

    Ok(NodeHandle {
        addr,
        hub,
        cancel,
        tasks,
    })
}

impl NodeHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Stop accepting, stop sync and heartbeat, close every session.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Node task panicked");
            }
        }
        info!(node = %self.hub.info.name, "Node stopped");
    }
}
