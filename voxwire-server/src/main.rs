//! voxwire-server binary

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voxwire_server::{BindAddress, Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    let default_level = if config.debug { "debug" } else { "info" };
    // Logs go to stderr; in stdio mode stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = config.loader_settings()?;
    info!(
        "Starting voxwire-server v{} (library: {}, model: {})",
        env!("CARGO_PKG_VERSION"),
        settings.library,
        settings.model.as_deref().unwrap_or("auto"),
    );

    let server = Server::new(settings);
    tokio::select! {
        result = server.run(&config.uri) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, exiting");
        }
    }

    if let Ok(BindAddress::Unix(path)) = BindAddress::parse(&config.uri) {
        let _ = std::fs::remove_file(path);
    }
    Ok(())
}
