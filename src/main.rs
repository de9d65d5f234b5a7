use std::sync::Arc;

use anyhow::{Context, Result};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fadvendas_gate::{
    gate::overlay::{follow_gate, Overlay, OverlayRenderer},
    server::server::Server,
    GateConfig, StoreHoursGate,
};

const DEFAULT_PORT: u16 = 7878;

/// Writes the overlay to the log. Stands in for the web UI's overlay element.
struct LogRenderer;

impl OverlayRenderer for LogRenderer {
    fn show(&mut self, overlay: &Overlay) {
        info!(status = %overlay.status, "store closed overlay shown\n{}", overlay);
    }

    fn clear(&mut self) {
        info!("store open, overlay removed");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fadvendas_gate=info")),
        )
        .init();

    let config = GateConfig::from_env().context("invalid store hours configuration")?;
    let gate = Arc::new(StoreHoursGate::with_system_clock(&config)?);
    let poller = gate.start();
    tokio::spawn(follow_gate(gate.clone(), LogRenderer));

    let port: u16 = match std::env::var("FADVENDAS_PORT") {
        Ok(port) => port.parse().context("invalid FADVENDAS_PORT")?,
        Err(_) => DEFAULT_PORT,
    };
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    info!(port, "status api listening");
    let server = Server::setup(gate.clone());

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        error!(error = %err, "accept failed");
                        continue;
                    }
                };
                let io = TokioIo::new(stream);
                let server_clone = server.clone();
                tokio::spawn(async move {
                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, server_clone)
                        .await
                    {
                        error!(error = %err, "connection error");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}
