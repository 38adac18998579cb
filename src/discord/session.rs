//! Discord session lifecycle.
//!
//! Owns the single connection to Discord and the readiness flag the relay
//! checks before every remote-ward dispatch.

use std::sync::Arc;

use serenity::async_trait;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{error, info, warn};

use crate::common::error::{DiscordError, DiscordResult};
use crate::discord::platform::RemotePlatform;

/// Opens a connection to the chat platform.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and wait until the platform is ready for traffic.
    async fn connect(&self) -> DiscordResult<Arc<dyn RemotePlatform>>;
}

/// Shared session handle.
pub struct Session {
    connector: Arc<dyn Connector>,
    /// Serialises start/stop so concurrent starts cannot both connect.
    lifecycle: Mutex<()>,
    platform: RwLock<Option<Arc<dyn RemotePlatform>>>,
    ready_tx: watch::Sender<bool>,
    ready_rx: watch::Receiver<bool>,
}

impl Session {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        let (ready_tx, ready_rx) = watch::channel(false);
        Self {
            connector,
            lifecycle: Mutex::new(()),
            platform: RwLock::new(None),
            ready_tx,
            ready_rx,
        }
    }

    /// Connect to Discord. Calling this while already started does nothing.
    pub async fn start(&self) -> DiscordResult<()> {
        let _guard = self.lifecycle.lock().await;

        if self.platform.read().await.is_some() {
            warn!("Discord bot is already running. Ignoring start request.");
            return Ok(());
        }

        info!("Connecting to Discord...");
        match self.connector.connect().await {
            Ok(platform) => {
                *self.platform.write().await = Some(platform);
                self.ready_tx.send_replace(true);
                info!("Discord bot is now online");
                Ok(())
            }
            Err(DiscordError::Authentication) => {
                error!("Failed to login to Discord with the provided token");
                Err(DiscordError::Authentication)
            }
            Err(e) => {
                error!("An unexpected error occurred during Discord bot startup: {}", e);
                Err(e)
            }
        }
    }

    /// Disconnect from Discord. Logs an error if the bot was never started.
    pub async fn stop(&self) {
        let _guard = self.lifecycle.lock().await;

        let platform = self.platform.write().await.take();
        match platform {
            Some(platform) => {
                self.ready_tx.send_replace(false);
                platform.shutdown().await;
                info!("Discord bot is now offline");
            }
            None => {
                error!("Discord bot is not initialized. Cannot stop the bot.");
            }
        }
    }

    /// Readiness snapshot.
    pub fn is_ready(&self) -> bool {
        *self.ready_rx.borrow()
    }

    /// Receiver that observes readiness changes.
    #[cfg(test)]
    pub fn subscribe_ready(&self) -> watch::Receiver<bool> {
        self.ready_rx.clone()
    }

    /// The connection handle, only while the session is ready.
    pub async fn ready_platform(&self) -> Option<Arc<dyn RemotePlatform>> {
        if !self.is_ready() {
            return None;
        }
        self.platform.read().await.clone()
    }
}
