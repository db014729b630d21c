//! chatmesh-client - interactive chat client with server failover.

use chatmesh::client::{self, ClientEvent, EventReceiver, HELP_LINES, format_server_list};
use chatmesh::config::{CLIENT_USAGE, ClientConfig, ClientTuning};
use chatmesh::telemetry;
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("warn");

    let tuning = ClientTuning::default();
    let (config, rejected) = ClientConfig::from_args(std::env::args().skip(1), tuning)
        .map_err(|e| {
            error!(error = %e, "Invalid arguments");
            eprintln!("{CLIENT_USAGE}");
            e
        })?;

    for e in &rejected {
        warn!(error = %e, "Ignoring malformed server descriptor");
    }

    println!("=== Cliente de Chat Distribuido ===");
    println!("Servidores configurados: {}", config.servers.len());

    let (input_tx, input_rx) = mpsc::channel(64);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(render(events_rx));

    let result = client::run(config, input_rx, events_tx).await;
    let _ = renderer.await;

    result.map_err(Into::into)
}

async fn render(mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        match event {
            ClientEvent::Connecting { server, .. } => println!("Conectando a {server}..."),
            ClientEvent::ConnectFailed { server, reason } => {
                println!("✗ Fallo al conectar a {server}: {reason}");
            }
            ClientEvent::Connected { name, .. } => println!("✓ Conectado a {name}"),
            ClientEvent::Prompt(prompt) => println!("{prompt}"),
            ClientEvent::Message(line) => println!("{line}"),
            ClientEvent::ConnectionLost { name, .. } => {
                println!("\n⚠ Conexión perdida con {name}");
                println!("Intentando reconectar...");
            }
            ClientEvent::Reconnected { name, .. } => {
                println!("✓ Reconexión exitosa ({name})");
            }
            ClientEvent::ServerList { servers, current } => {
                println!("\n=== Servidores disponibles ===");
                for line in format_server_list(&servers, current) {
                    println!("{line}");
                }
                println!("==============================\n");
            }
            ClientEvent::Help => {
                println!("\n=== Comandos disponibles ===");
                for (command, description) in HELP_LINES {
                    println!("{command} - {description}");
                }
                println!("===========================\n");
            }
            ClientEvent::Undelivered(line) => println!("✗ No se pudo enviar: {line}"),
            ClientEvent::GaveUp { reason } => {
                println!("✗ No se pudo conectar a ningún servidor ({reason}). Saliendo...");
            }
            ClientEvent::Disconnected => {
                println!("\nDesconectado del chat. ¡Hasta luego!");
                break;
            }
        }
    }
}
