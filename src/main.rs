//! Fabricord - Discord chat bridge for Minecraft servers
//!
//! Runs next to the game server. The server-side shim connects over TCP and
//! streams chat, join/leave and lifecycle events; the bridge relays them to a
//! Discord channel and broadcasts Discord chat back to the players.

mod bridge;
mod common;
mod config;
mod discord;
mod host;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info};

use bridge::Bridge;
use config::{env::get_config_path, load_and_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Fabricord v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Host listen: {}", config.host.listen);
    info!("  Message style: {:?}", config.discord.message_style);
    match config.discord.log_channel_id {
        Some(id) => info!("  Log channel: {}", id),
        None => info!("  Log channel: (none)"),
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut bridge_task = tokio::spawn(Bridge::new(&config).run(shutdown_rx));

    let result = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - stopping bridge...");
            if let Err(e) = shutdown_tx.send(true) {
                debug!("Shutdown channel closed (bridge already exited): {}", e);
            }
            bridge_task.await
        }
        finished = &mut bridge_task => finished,
    };

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("Bridge stopped: {}", e);
            return Err(e.into());
        }
        Err(e) => error!("Bridge task panicked: {}", e),
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
