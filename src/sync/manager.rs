//! Periodic full-history pull from every peer.

use chatmesh_proto::{MessageRecord, ServerDescriptor};
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, instrument};

use super::link::PeerLink;
use crate::error::PeerError;
use crate::state::Hub;
use crate::telemetry::spans;

/// Outcome of one sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records appended to the local log.
    pub merged: usize,
    /// Peers that answered with a well-formed `SYNC_DATA:`.
    pub reachable: usize,
    /// Peers skipped this cycle.
    pub unreachable: usize,
}

/// Pulls every peer's history on a fixed interval and merges what is new.
#[derive(Clone)]
pub struct ReplicationSync {
    hub: Arc<Hub>,
    peers: Arc<[ServerDescriptor]>,
}

impl ReplicationSync {
    pub fn new(hub: Arc<Hub>) -> Self {
        let peers = hub.replicator.peers().to_vec().into();
        Self { hub, peers }
    }

    /// Run until `cancel` fires. The first cycle starts one interval in.
    #[instrument(skip_all, name = "sync", fields(node = %self.hub.info.name))]
    pub async fn run(self, cancel: CancellationToken) {
        if self.peers.is_empty() {
            info!("No peers configured, replication sync idle");
            return;
        }

        let period = self.hub.tuning.sync_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(peers = self.peers.len(), ?period, "Replication sync started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let report = self.sync_once().await;
                    if report.merged > 0 {
                        info!(merged = report.merged, reachable = report.reachable, "Merged remote history");
                    } else {
                        debug!(reachable = report.reachable, unreachable = report.unreachable, "Sync cycle complete");
                    }
                }
            }
        }
        info!("Replication sync stopped");
    }

    /// One cycle: pull every peer concurrently, then merge in peer order.
    pub async fn sync_once(&self) -> SyncReport {
        let tuning = &self.hub.tuning;
        let pulls = self.peers.iter().map(|peer| {
            let span = spans::peer(&peer.to_string(), "sync");
            async move {
                let link = PeerLink::connect(peer, tuning.sync_connect_timeout()).await?;
                link.pull(tuning.sync_read_timeout()).await
            }
            .instrument(span)
        });
        let results: Vec<Result<Vec<MessageRecord>, PeerError>> = join_all(pulls).await;

        let mut report = SyncReport::default();
        for (peer, result) in self.peers.iter().zip(results) {
            match result {
                Ok(records) => {
                    report.reachable += 1;
                    report.merged += self.merge(records);
                }
                Err(e) => {
                    report.unreachable += 1;
                    debug!(%peer, code = e.error_code(), error = %e, "Peer skipped this cycle");
                }
            }
        }
        report
    }

    fn merge(&self, records: Vec<MessageRecord>) -> usize {
        records
            .into_iter()
            .filter(|record| !record.as_str().is_empty())
            .filter(|record| self.hub.log.append_if_absent(record.clone()))
            .count()
    }
}
