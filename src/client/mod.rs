//! Interactive client with server failover.
//!
//! ```text
//!   operator input ──▶ send loop ──▶ writer slot ──▶ server
//!                          │              ▲
//!                  local commands         │ replaced on reconnect
//!                          ▼              │
//!                      ClientEvent ◀── receive task ◀── server
//! ```
//!
//! The receive task owns the read half and the failover path. The write half
//! lives in a shared slot so the send loop always writes to whichever server
//! is current.

mod command;
mod event;
mod failover;
mod prompt;

pub use command::{HELP_LINES, LocalCommand};
pub use event::{ClientEvent, EventReceiver, EventSender};
pub use failover::{Connection, FailoverManager, LineReader, LineWriter};
pub use prompt::{ConsolePrompt, SharedInput, UsernamePrompt};

use chatmesh_proto::{ServerDescriptor, ServerLine};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;

type WriterSlot = Arc<Mutex<Option<LineWriter>>>;

/// Run the client until the operator quits, input ends or every server is
/// gone. `input` carries operator lines; `events` receives everything to show.
pub async fn run(
    config: ClientConfig,
    input: mpsc::Receiver<String>,
    events: EventSender,
) -> Result<(), ClientError> {
    let input: SharedInput = Arc::new(Mutex::new(input));
    let prompt = Arc::new(ConsolePrompt::new(Arc::clone(&input), events.clone()));
    let manager = Arc::new(FailoverManager::new(
        config.servers,
        config.tuning,
        prompt,
        events.clone(),
    ));
    let cancel = CancellationToken::new();

    let connection = match manager.connect(&cancel).await {
        Ok(connection) => connection,
        Err(e) => {
            let _ = events.send(ClientEvent::GaveUp {
                reason: e.to_string(),
            });
            let _ = events.send(ClientEvent::Disconnected);
            return Err(e);
        }
    };
    let _ = events.send(ClientEvent::Connected {
        server: connection.server.clone(),
        name: connection.name.clone(),
    });

    let writer: WriterSlot = Arc::new(Mutex::new(Some(connection.writer)));
    let receiver = tokio::spawn(receive_flow(
        Arc::clone(&manager),
        connection.reader,
        connection.name,
        Arc::clone(&writer),
        events.clone(),
        cancel.clone(),
    ));

    send_flow(&manager, &input, &writer, &events, &cancel).await;
    cancel.cancel();

    let result = match receiver.await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Receive task failed");
            Ok(())
        }
    };

    if let Some(mut w) = writer.lock().await.take() {
        let _ = SinkExt::<&str>::close(&mut w).await;
    }
    let _ = events.send(ClientEvent::Disconnected);
    info!("Client stopped");
    result
}

/// Display server lines; on loss, fail over and keep going.
async fn receive_flow(
    manager: Arc<FailoverManager>,
    mut reader: LineReader,
    mut name: String,
    writer: WriterSlot,
    events: EventSender,
    cancel: CancellationToken,
) -> Result<(), ClientError> {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            next = reader.next() => next,
        };

        let reason = match next {
            Some(Ok(line)) => {
                if !matches!(ServerLine::classify(&line), ServerLine::Heartbeat(_)) {
                    let _ = events.send(ClientEvent::Message(line));
                }
                continue;
            }
            Some(Err(e)) => e.to_string(),
            None => "connection closed".to_string(),
        };

        warn!(server = %name, %reason, "Connection lost");
        let _ = events.send(ClientEvent::ConnectionLost {
            name: name.clone(),
            reason,
        });
        writer.lock().await.take();
        manager.advance();

        match manager.connect(&cancel).await {
            Ok(connection) => {
                let _ = events.send(ClientEvent::Reconnected {
                    server: connection.server.clone(),
                    name: connection.name.clone(),
                });
                *writer.lock().await = Some(connection.writer);
                reader = connection.reader;
                name = connection.name;
            }
            Err(ClientError::Cancelled) => return Ok(()),
            Err(e) => {
                let _ = events.send(ClientEvent::GaveUp {
                    reason: e.to_string(),
                });
                cancel.cancel();
                return Err(e);
            }
        }
    }
}

/// Forward operator lines and handle local commands.
async fn send_flow(
    manager: &FailoverManager,
    input: &SharedInput,
    writer: &WriterSlot,
    events: &EventSender,
    cancel: &CancellationToken,
) {
    loop {
        let line = {
            let mut input = input.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => None,
                line = input.recv() => line,
            }
        };
        let Some(line) = line else {
            debug!("Input closed");
            return;
        };

        match LocalCommand::parse(&line) {
            Some(LocalCommand::Quit) => return,
            Some(LocalCommand::Servers) => {
                let _ = events.send(ClientEvent::ServerList {
                    servers: manager.candidates().to_vec(),
                    current: manager.current_index(),
                });
            }
            Some(LocalCommand::Help) => {
                let _ = events.send(ClientEvent::Help);
            }
            None if line.trim().is_empty() => {}
            None => {
                let mut slot = writer.lock().await;
                let delivered = match slot.as_mut() {
                    Some(w) => match w.send(line.as_str()).await {
                        Ok(()) => true,
                        Err(e) => {
                            debug!(error = %e, "Write failed");
                            false
                        }
                    },
                    None => false,
                };
                if !delivered {
                    let _ = events.send(ClientEvent::Undelivered(line));
                }
            }
        }
    }
}

/// Render a server list the way `/servidores` shows it.
pub fn format_server_list(servers: &[ServerDescriptor], current: usize) -> Vec<String> {
    servers
        .iter()
        .enumerate()
        .map(|(i, server)| {
            let marker = if i == current { " [ACTUAL]" } else { "" };
            format!("{}. {}{}", i + 1, server, marker)
        })
        .collect()
}
