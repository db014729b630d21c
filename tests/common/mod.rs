//! Integration test common infrastructure.
//!
//! Nodes run in-process on ephemeral ports with short timeouts. Clients speak
//! the raw line protocol so tests can assert on exact wire text.

pub mod client;
pub mod relay;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use relay::TcpRelay;
#[allow(unused_imports)]
pub use server::{TestCluster, TestNode};

use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Poll `condition` until it holds or `limit` passes.
#[allow(dead_code)]
pub async fn wait_for<F>(limit: Duration, mut condition: F) -> anyhow::Result<()>
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return Ok(());
        }
        sleep(Duration::from_millis(20)).await;
    }
    if condition() {
        return Ok(());
    }
    anyhow::bail!("condition not met within {limit:?}")
}

/// A port nothing listens on.
#[allow(dead_code)]
pub async fn refused_port() -> anyhow::Result<u16> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}
