//! Bridge orchestrator that ties the host link and Discord together.
//!
//! Owns every long-lived piece: the Discord session, the relay, the host
//! link and the dispatcher feeding the relay.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::bridge::dispatch::{wait_for_shutdown, Dispatcher, EventSender};
use crate::bridge::filter::MessageFilter;
use crate::bridge::relay::{Relay, RelaySettings};
use crate::common::error::{AppError, DiscordError};
use crate::common::messages::{InboundEvent, LifecycleKind};
use crate::config::types::Config;
use crate::discord::client::DiscordConnector;
use crate::discord::session::{Connector, Session};
use crate::host::link::HostLink;

/// The running bridge.
pub struct Bridge {
    session: Arc<Session>,
    relay: Arc<Relay>,
    host: Arc<HostLink>,
    dispatcher: Dispatcher,
    listen: String,
}

impl Bridge {
    /// Bridge connected to Discord through serenity.
    pub fn new(config: &Config) -> Self {
        let discord = config.discord.clone();
        Self::with_connector(config, move |events| {
            Arc::new(DiscordConnector::new(discord, events))
        })
    }

    /// Bridge using a custom connector, which receives the remote event sender.
    pub fn with_connector(
        config: &Config,
        connector: impl FnOnce(EventSender) -> Arc<dyn Connector>,
    ) -> Self {
        let (dispatcher, events) = Dispatcher::new();

        let session = Arc::new(Session::new(connector(events.clone())));
        let host = Arc::new(HostLink::new(events));
        let filter = MessageFilter::from_config(config.filters.as_ref());
        let relay = Arc::new(Relay::new(
            session.clone(),
            host.clone(),
            filter,
            RelaySettings::from_config(config),
        ));

        Self {
            session,
            relay,
            host,
            dispatcher,
            listen: config.host.listen.clone(),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> Arc<Session> {
        self.session.clone()
    }

    /// Run until `shutdown_rx` flips to `true` or the host listener fails.
    ///
    /// An invalid token is fatal. Any other startup failure leaves the
    /// session not ready, and relay calls are dropped until restart.
    pub async fn run(self, shutdown_rx: watch::Receiver<bool>) -> Result<(), AppError> {
        let Bridge {
            session,
            relay,
            host,
            dispatcher,
            listen,
        } = self;

        match session.start().await {
            Ok(()) => {}
            Err(DiscordError::Authentication) => return Err(DiscordError::Authentication.into()),
            Err(e) => warn!("Continuing without Discord: {}", e),
        }

        let dispatcher = tokio::spawn(dispatcher.run(relay.clone(), shutdown_rx.clone()));
        let link = host.clone();
        let host_rx = shutdown_rx.clone();
        let mut listener = tokio::spawn(async move { host.serve(&listen, host_rx).await });

        let mut shutdown = shutdown_rx;
        let outcome = tokio::select! {
            _ = wait_for_shutdown(&mut shutdown) => Ok(()),
            served = &mut listener => match served {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    error!("Host listener failed: {}", e);
                    Err(AppError::from(e))
                }
                Err(e) => {
                    error!("Host listener task failed: {}", e);
                    Ok(())
                }
            },
        };

        if !link.is_connected() {
            info!("No host connected at shutdown");
        }
        stop_session(&relay, &session).await;

        if let Err(e) = dispatcher.await {
            warn!("Dispatcher task ended abnormally: {}", e);
        }
        listener.abort();

        outcome
    }
}

/// Announce the stop (unless the host already did) and disconnect.
async fn stop_session(relay: &Relay, session: &Session) {
    if relay.last_lifecycle() != Some(LifecycleKind::Stop) {
        info!("Sending server stop notice");
        relay
            .relay_inbound(InboundEvent::Lifecycle(LifecycleKind::Stop))
            .await;
    }
    session.stop().await;
}
