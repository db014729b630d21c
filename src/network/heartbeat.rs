//! Liveness lines for idle clients.
//!
//! When enabled, every local session periodically receives
//! `HEARTBEAT:<node name>`. Heartbeats bypass the message log and are never
//! replicated; clients filter them out before display.

use chatmesh_proto::heartbeat;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::state::Hub;

#[instrument(skip_all, name = "heartbeat", fields(node = %hub.info.name))]
pub async fn run_heartbeat(hub: Arc<Hub>, period: Duration, cancel: CancellationToken) {
    let line: Arc<str> = Arc::from(heartbeat(&hub.info.name));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(?period, "Heartbeat started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let delivered = hub.router.broadcast_line(Arc::clone(&line), None);
                debug!(delivered, "Heartbeat sent");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, ServerTuning};

    #[tokio::test]
    async fn test_heartbeat_reaches_sessions_and_skips_log() {
        let hub = Arc::new(Hub::new(&ServerConfig {
            port: 0,
            name: "alfa".into(),
            peers: Vec::new(),
            tuning: ServerTuning::default(),
        }));
        let (_id, mut rx) = hub.router.register("ana");
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_heartbeat(
            Arc::clone(&hub),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        let line = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&*line, "HEARTBEAT:alfa");
        assert!(hub.log.is_empty());

        cancel.cancel();
        task.await.unwrap();
    }
}
