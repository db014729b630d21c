//! Gateway - TCP listener that accepts incoming connections.
//!
//! Clients and peers share the one listening socket. The Gateway spawns a
//! task per accepted stream; role detection happens inside that task so a
//! slow client never stalls the accept loop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, instrument};

use super::dispatch::handle_connection;
use crate::state::Hub;
use crate::telemetry::spans;

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    hub: Arc<Hub>,
}

impl Gateway {
    /// Wrap an already bound listener.
    pub fn from_listener(listener: TcpListener, hub: Arc<Hub>) -> Self {
        Self { listener, hub }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `cancel` fires. Each connection gets a child
    /// token so node shutdown reaches every session.
    #[instrument(skip_all, name = "gateway", fields(node = %self.hub.info.name))]
    pub async fn run(self, cancel: CancellationToken) -> anyhow::Result<()> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!(%addr, "Connection accepted");
                        if let Err(e) = stream.set_nodelay(true) {
                            error!(%addr, error = %e, "Failed to set TCP_NODELAY");
                        }
                        let hub = Arc::clone(&self.hub);
                        let token = cancel.child_token();
                        tokio::spawn(
                            async move {
                                handle_connection(stream, hub, token).await;
                                info!("Connection closed");
                            }
                            .instrument(spans::connection(&addr.to_string())),
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                },
            }
        }
        info!("Gateway stopped");
        Ok(())
    }
}
