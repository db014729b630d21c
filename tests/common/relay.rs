//! Cuttable TCP relay.
//!
//! Sits between a client and a node so a test can drop the client's
//! connection while the node keeps running.

use chatmesh_proto::ServerDescriptor;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

pub struct TcpRelay {
    port: u16,
    cut: CancellationToken,
}

#[allow(dead_code)]
impl TcpRelay {
    /// Forward every accepted connection to `target` until [`TcpRelay::cut`].
    pub async fn spawn(target: String) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let cut = CancellationToken::new();

        let token = cut.clone();
        tokio::spawn(async move {
            loop {
                let accepted = tokio::select! {
                    _ = token.cancelled() => return,
                    accepted = listener.accept() => accepted,
                };
                let Ok((mut inbound, _)) = accepted else {
                    return;
                };
                let target = target.clone();
                let token = token.clone();
                tokio::spawn(async move {
                    let Ok(mut outbound) = TcpStream::connect(&target).await else {
                        return;
                    };
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = tokio::io::copy_bidirectional(&mut inbound, &mut outbound) => {}
                    }
                });
            }
        });

        Ok(Self { port, cut })
    }

    pub fn descriptor(&self) -> ServerDescriptor {
        ServerDescriptor::new("127.0.0.1", self.port)
    }

    /// Close every relayed connection and stop accepting new ones. Both ends
    /// see EOF.
    pub fn cut(&self) {
        self.cut.cancel();
    }
}
