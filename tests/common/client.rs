//! Raw line test client.
//!
//! Reads and writes protocol lines directly, so assertions see exactly what a
//! terminal user or a peer would.

use chatmesh_proto::{HEARTBEAT_PREFIX, HISTORY_END, HISTORY_START, USERNAME_PROMPT, banner};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Open a connection without any handshake.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Connect, answer the prompt and consume the history block. Returns the
    /// client and the replayed records.
    pub async fn join(
        address: &str,
        node_name: &str,
        username: &str,
    ) -> anyhow::Result<(Self, Vec<String>)> {
        let mut client = Self::connect(address).await?;
        client.expect_greeting(node_name).await?;
        client.send_line(username).await?;
        let history = client.read_history().await?;
        Ok((client, history))
    }

    /// Expect the banner and the username prompt.
    pub async fn expect_greeting(&mut self, node_name: &str) -> anyhow::Result<()> {
        let line = self.recv().await?;
        anyhow::ensure!(line == banner(node_name), "expected banner, got {line:?}");
        let line = self.recv().await?;
        anyhow::ensure!(line == USERNAME_PROMPT, "expected prompt, got {line:?}");
        Ok(())
    }

    /// Read the history block and return the records inside it.
    pub async fn read_history(&mut self) -> anyhow::Result<Vec<String>> {
        let line = self.recv().await?;
        anyhow::ensure!(line == HISTORY_START, "expected history start, got {line:?}");
        let mut records = Vec::new();
        loop {
            let line = self.recv().await?;
            if line == HISTORY_END {
                return Ok(records);
            }
            records.push(line);
        }
    }

    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next line, including heartbeats.
    pub async fn recv_raw(&mut self) -> anyhow::Result<String> {
        self.recv_raw_timeout(RECV_TIMEOUT).await
    }

    async fn recv_raw_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        anyhow::ensure!(n > 0, "connection closed");
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Next line that is not a heartbeat.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        loop {
            let line = self.recv_raw().await?;
            if !line.starts_with(HEARTBEAT_PREFIX) {
                return Ok(line);
            }
        }
    }

    /// Assert nothing but heartbeats arrives within `dur`.
    #[allow(dead_code)]
    pub async fn expect_none(&mut self, dur: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + dur;
        loop {
            let left = deadline.saturating_duration_since(tokio::time::Instant::now());
            if left.is_zero() {
                return Ok(());
            }
            match self.recv_raw_timeout(left).await {
                Ok(line) if line.starts_with(HEARTBEAT_PREFIX) => continue,
                Ok(line) => anyhow::bail!("unexpected line {line:?}"),
                Err(e) if e.is::<tokio::time::error::Elapsed>() => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Assert the server closes the connection.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await??;
        anyhow::ensure!(n == 0, "expected close, got {line:?}");
        Ok(())
    }
}
