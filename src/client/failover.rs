//! Candidate rotation and (re)connection for the interactive client.
//!
//! The manager walks the candidate list circularly. A full pass that finds
//! nothing is retried once more before giving up, with a fixed pause between
//! attempts. The username is asked for on the first successful handshake only;
//! later handshakes replay it without involving the operator.

use chatmesh_proto::{LineCodec, ServerDescriptor, ServerLine, USERNAME_PROMPT};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use super::event::{ClientEvent, EventSender};
use super::prompt::UsernamePrompt;
use crate::config::ClientTuning;
use crate::error::ClientError;
use crate::telemetry::spans;

pub type LineReader = FramedRead<OwnedReadHalf, LineCodec>;
pub type LineWriter = FramedWrite<OwnedWriteHalf, LineCodec>;

/// A handshaken connection to one server.
pub struct Connection {
    pub server: ServerDescriptor,
    /// Name from the server's banner, or the descriptor when it sent none.
    pub name: String,
    pub reader: LineReader,
    pub writer: LineWriter,
}

pub struct FailoverManager {
    candidates: Arc<[ServerDescriptor]>,
    current: AtomicUsize,
    username: Mutex<Option<String>>,
    tuning: ClientTuning,
    prompt: Arc<dyn UsernamePrompt>,
    events: EventSender,
}

impl FailoverManager {
    pub fn new(
        candidates: Vec<ServerDescriptor>,
        tuning: ClientTuning,
        prompt: Arc<dyn UsernamePrompt>,
        events: EventSender,
    ) -> Self {
        Self {
            candidates: candidates.into(),
            current: AtomicUsize::new(0),
            username: Mutex::new(None),
            tuning,
            prompt,
            events,
        }
    }

    pub fn candidates(&self) -> &[ServerDescriptor] {
        &self.candidates
    }

    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    pub fn current_server(&self) -> Option<&ServerDescriptor> {
        self.candidates.get(self.current_index())
    }

    pub fn username(&self) -> Option<String> {
        self.username.lock().clone()
    }

    /// Move to the next candidate, wrapping around.
    pub fn advance(&self) {
        let len = self.candidates.len().max(1);
        let _ = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len));
    }

    /// Connect to the current candidate, rotating on failure, for up to two
    /// full passes over the list.
    pub async fn connect(&self, cancel: &CancellationToken) -> Result<Connection, ClientError> {
        let attempts = self.candidates.len() * 2;

        for attempt in 1..=attempts {
            let Some(server) = self.current_server().cloned() else {
                break;
            };
            self.emit(ClientEvent::Connecting {
                server: server.clone(),
                attempt,
            });

            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                result = self
                    .try_server(&server)
                    .instrument(spans::server(&server.to_string())) => result,
            };

            match result {
                Ok(connection) => return Ok(connection),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(%server, attempt, error = %e, "Connection attempt failed");
                    self.emit(ClientEvent::ConnectFailed {
                        server,
                        reason: e.to_string(),
                    });
                }
            }

            self.advance();
            if attempt < attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                    _ = tokio::time::sleep(self.tuning.retry_delay()) => {}
                }
            }
        }

        Err(ClientError::Exhausted { attempts })
    }

    async fn try_server(&self, server: &ServerDescriptor) -> Result<Connection, ClientError> {
        let stream = timeout(
            self.tuning.connect_timeout(),
            TcpStream::connect((server.host.as_str(), server.port)),
        )
        .await
        .map_err(|_| ClientError::ConnectTimeout)?
        .map_err(ClientError::Connect)?;

        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(read_half, LineCodec::with_max_len(self.tuning.max_line_len));
        let mut writer =
            FramedWrite::new(write_half, LineCodec::with_max_len(self.tuning.max_line_len));

        let (name, prompt) = timeout(self.tuning.handshake_timeout(), read_greeting(&mut reader))
            .await
            .map_err(|_| ClientError::HandshakeTimeout)??;
        let name = name.unwrap_or_else(|| server.to_string());

        let username = self.resolve_username(&prompt).await?;
        writer.send(username.as_str()).await?;
        info!(%server, %name, %username, "Connected");

        Ok(Connection {
            server: server.clone(),
            name,
            reader,
            writer,
        })
    }

    async fn resolve_username(&self, prompt: &str) -> Result<String, ClientError> {
        if let Some(username) = self.username() {
            return Ok(username);
        }
        let username = self
            .prompt
            .ask(prompt)
            .await
            .ok_or(ClientError::NoUsername)?;
        *self.username.lock() = Some(username.clone());
        Ok(username)
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }
}

/// Read up to and including the username prompt. Returns the banner name, if
/// one was sent, and the prompt text.
async fn read_greeting(reader: &mut LineReader) -> Result<(Option<String>, String), ClientError> {
    let mut name = None;
    while let Some(line) = reader.next().await {
        let line = line?;
        match ServerLine::classify(&line) {
            ServerLine::Banner(banner) => name = Some(banner.to_string()),
            ServerLine::Heartbeat(_) => {}
            ServerLine::Text(text) if text == USERNAME_PROMPT => {
                return Ok((name, text.to_string()));
            }
            ServerLine::Text(text) => debug!(line = %text, "Unexpected line before prompt"),
        }
    }
    Err(ClientError::HandshakeClosed)
}
