//! ClientSession - one interactive client attached to this node.
//!
//! Each session runs inside the connection's Tokio task:
//!
//! ```text
//! Connecting ──▶ Handshaking ──▶ Active ──▶ Closed
//!                   │  banner, prompt,         ▲
//!                   │  username                │
//!                   └── rejected / EOF ────────┘
//!
//! Active:
//!   register ─▶ history block ─▶ join record
//!   tokio::select! {
//!       outbound queue  ─▶ socket
//!       socket lines    ─▶ chat records (log, broadcast, push)
//!       node shutdown   ─▶ close without a leave record
//!   }
//! ```
//!
//! The session is registered before the history snapshot is taken, so no
//! record can fall between the replay and the first live delivery. A record
//! landing in that window may show up twice; it is never lost.
//!
//! Every line a session writes must fit `max_line_len`. A chat line that would
//! not fit once prefixed with the username is dropped before it is recorded,
//! and an outbound line that does not fit is skipped for this recipient only.

mod handshake;

pub use handshake::validate_username;

use chatmesh_proto::{HISTORY_END, HISTORY_START, LineCodec, MessageRecord, is_control_line};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::SessionError;
use crate::state::{Hub, SessionId, SessionReceiver};

/// Lifecycle of a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Handshaking,
    Active,
    Closed,
}

/// Why the active loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The client went away.
    Disconnected,
    /// The node is shutting down.
    Shutdown,
}

pub struct ClientSession<S> {
    framed: Framed<S, LineCodec>,
    hub: Arc<Hub>,
    sniffed: Option<String>,
    phase: SessionPhase,
}

impl<S> ClientSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// `sniffed` is a line the dispatcher already consumed; it becomes the
    /// username instead of reading one after the prompt.
    pub fn new(framed: Framed<S, LineCodec>, hub: Arc<Hub>, sniffed: Option<String>) -> Self {
        Self {
            framed,
            hub,
            sniffed,
            phase: SessionPhase::Connecting,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn transition(&mut self, next: SessionPhase) {
        debug!(from = ?self.phase, to = ?next, "Session phase change");
        self.phase = next;
    }

    /// Whether `line` can be written without exceeding the line limit.
    fn fits(&self, line: &str) -> bool {
        line.len() < self.hub.tuning.max_line_len
    }

    /// Run the session until the client leaves or `cancel` fires.
    #[instrument(skip_all, name = "session", fields(node = %self.hub.info.name))]
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), SessionError> {
        self.transition(SessionPhase::Handshaking);
        let sniffed = self.sniffed.take();
        let handshake = tokio::select! {
            _ = cancel.cancelled() => None,
            result = handshake::perform(&mut self.framed, &self.hub.info.name, sniffed) => Some(result),
        };
        let username = match handshake {
            Some(Ok(username)) => username,
            Some(Err(e)) => {
                self.transition(SessionPhase::Closed);
                return Err(e);
            }
            None => {
                self.transition(SessionPhase::Closed);
                return Ok(());
            }
        };

        let (id, mut outbound) = self.hub.router.register(&username);
        self.transition(SessionPhase::Active);

        if let Err(e) = self.replay_history().await {
            self.hub.router.unregister(id);
            self.transition(SessionPhase::Closed);
            return Err(e);
        }

        self.hub.publish_local(MessageRecord::joined(&username), id);
        info!(session = %id, %username, "Client joined");

        let outcome = self.relay(id, &username, &mut outbound, &cancel).await;

        self.hub.router.unregister(id);
        self.transition(SessionPhase::Closed);

        match outcome {
            Ok(SessionEnd::Shutdown) => {
                info!(session = %id, %username, "Session closed by node shutdown");
                Ok(())
            }
            Ok(SessionEnd::Disconnected) => {
                self.hub.publish_local(MessageRecord::left(&username), id);
                info!(session = %id, %username, "Client left");
                Ok(())
            }
            Err(e) => {
                self.hub.publish_local(MessageRecord::left(&username), id);
                info!(session = %id, %username, error = %e, "Client dropped");
                Err(e)
            }
        }
    }

    /// Send the full log between the history markers.
    async fn replay_history(&mut self) -> Result<(), SessionError> {
        let snapshot = self.hub.log.snapshot();
        self.framed.feed(HISTORY_START).await?;
        for record in &snapshot {
            if !self.fits(record.as_str()) {
                warn!(len = record.as_str().len(), "Skipping oversized record in history");
                continue;
            }
            self.framed.feed(record.as_str()).await?;
        }
        self.framed.send(HISTORY_END).await?;
        debug!(records = snapshot.len(), "History replayed");
        Ok(())
    }

    async fn relay(
        &mut self,
        id: SessionId,
        username: &str,
        outbound: &mut SessionReceiver,
        cancel: &CancellationToken,
    ) -> Result<SessionEnd, SessionError> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(SessionEnd::Shutdown),

                line = outbound.recv() => match line {
                    Some(line) if self.fits(&line) => self.framed.send(line).await?,
                    Some(line) => {
                        warn!(session = %id, len = line.len(), "Skipping oversized outbound line");
                    }
                    None => return Ok(SessionEnd::Disconnected),
                },

                inbound = self.framed.next() => match inbound {
                    Some(Ok(text)) => {
                        if is_control_line(&text) {
                            continue;
                        }
                        let record = MessageRecord::chat(username, &text);
                        if !self.fits(record.as_str()) {
                            info!(session = %id, len = record.as_str().len(), "Dropping chat line over the line limit");
                            continue;
                        }
                        self.hub.publish_local(record, id);
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(SessionEnd::Disconnected),
                },
            }
        }
    }
}
