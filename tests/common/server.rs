//! In-process test nodes.

use chatmesh::config::{ServerConfig, ServerTuning};
use chatmesh::node::{self, NodeHandle};
use chatmesh::state::Hub;
use chatmesh_proto::ServerDescriptor;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::client::TestClient;

/// Short timeouts so failures surface quickly.
pub fn fast_tuning() -> ServerTuning {
    ServerTuning {
        sniff_timeout_ms: 50,
        sync_interval_ms: 200,
        sync_connect_timeout_ms: 200,
        sync_read_timeout_ms: 300,
        push_connect_timeout_ms: 200,
        ..ServerTuning::default()
    }
}

/// A running node bound to an ephemeral loopback port.
pub struct TestNode {
    handle: NodeHandle,
    name: String,
}

impl TestNode {
    /// Spawn a node with no peers.
    pub async fn spawn(name: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Self::spawn_on(listener, name, Vec::new(), fast_tuning())
    }

    /// Spawn a node on a bound listener.
    pub fn spawn_on(
        listener: TcpListener,
        name: &str,
        peers: Vec<ServerDescriptor>,
        tuning: ServerTuning,
    ) -> anyhow::Result<Self> {
        let port = listener.local_addr()?.port();
        let config = ServerConfig {
            port,
            name: name.to_string(),
            peers,
            tuning,
        };
        let handle = node::start_with_listener(listener, config, CancellationToken::new())?;
        Ok(Self {
            handle,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.handle.local_addr().port())
    }

    pub fn descriptor(&self) -> ServerDescriptor {
        ServerDescriptor::new("127.0.0.1", self.handle.local_addr().port())
    }

    pub fn hub(&self) -> &Arc<Hub> {
        self.handle.hub()
    }

    /// Log contents as plain strings.
    pub fn log(&self) -> Vec<String> {
        self.hub()
            .log
            .snapshot()
            .into_iter()
            .map(|r| r.into_string())
            .collect()
    }

    /// Connect and complete the handshake as `username`.
    pub async fn join(&self, username: &str) -> anyhow::Result<TestClient> {
        let (client, _history) = TestClient::join(&self.address(), self.name(), username).await?;
        Ok(client)
    }

    pub async fn shutdown(self) {
        self.handle.shutdown().await;
    }
}

/// Nodes that all list each other as peers.
pub struct TestCluster {
    pub nodes: Vec<TestNode>,
}

impl TestCluster {
    pub async fn spawn(names: &[&str], tuning: ServerTuning) -> anyhow::Result<Self> {
        let mut listeners = Vec::with_capacity(names.len());
        for _ in names {
            listeners.push(TcpListener::bind("127.0.0.1:0").await?);
        }
        let descriptors = listeners
            .iter()
            .map(|l| Ok(ServerDescriptor::new("127.0.0.1", l.local_addr()?.port())))
            .collect::<std::io::Result<Vec<_>>>()?;

        let mut nodes = Vec::with_capacity(names.len());
        for (i, (listener, name)) in listeners.into_iter().zip(names).enumerate() {
            let peers = descriptors
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, d)| d.clone())
                .collect();
            nodes.push(TestNode::spawn_on(listener, name, peers, tuning.clone())?);
        }
        Ok(Self { nodes })
    }

    pub fn node(&self, i: usize) -> &TestNode {
        &self.nodes[i]
    }
}
