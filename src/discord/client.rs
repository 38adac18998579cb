//! Serenity-backed [`Connector`].
//!
//! Builds the gateway client, waits for `Ready`, and hands the session a
//! [`DiscordPlatform`] bound to the running shard manager.

use std::sync::Arc;
use std::time::Duration;

use serenity::all::{Http, Webhook, WebhookId};
use serenity::async_trait;
use serenity::http::HttpBuilder;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::bridge::dispatch::EventSender;
use crate::common::error::{DiscordError, DiscordResult};
use crate::common::types::MessageStyle;
use crate::config::types::DiscordConfig;
use crate::discord::commands::{parse_activity, parse_status};
use crate::discord::handler::GatewayHandler;
use crate::discord::platform::{DiscordPlatform, RemotePlatform};
use crate::discord::session::Connector;

/// How long to wait for the gateway `Ready` event.
pub const READY_TIMEOUT: Duration = Duration::from_secs(15);

/// Connects the bot with the configured token, status and activity.
pub struct DiscordConnector {
    config: DiscordConfig,
    events: EventSender,
}

impl DiscordConnector {
    pub fn new(config: DiscordConfig, events: EventSender) -> Self {
        Self { config, events }
    }

    async fn build_client(&self, ready_tx: oneshot::Sender<()>) -> DiscordResult<Client> {
        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILDS;

        // Build a custom reqwest client with timeout settings
        let reqwest_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let http = HttpBuilder::new(&self.config.token)
            .client(reqwest_client)
            .build();

        let handler = GatewayHandler::new(self.events.clone(), ready_tx);
        let client = serenity::client::ClientBuilder::new_with_http(http, intents)
            .event_handler(handler)
            .status(parse_status(self.config.status.as_deref()))
            .activity(parse_activity(&self.config.activity))
            .await
            .map_err(DiscordError::from_startup)?;
        Ok(client)
    }

    /// The persona webhook, when the modern style asks for one.
    async fn resolve_webhook(&self, http: &Http) -> Option<Webhook> {
        if self.config.message_style != MessageStyle::Modern {
            return None;
        }
        let Some(webhook_id) = self.config.webhook_id else {
            error!("The message style is set to 'modern' but the webhook URL is not configured.");
            return None;
        };

        match http.get_webhook(WebhookId::new(webhook_id)).await {
            Ok(webhook) if webhook.token.is_some() => {
                info!("Using webhook '{}' for player messages", webhook.name.as_deref().unwrap_or("?"));
                Some(webhook)
            }
            Ok(_) => {
                error!("Webhook {} has no token; falling back to classic messages", webhook_id);
                None
            }
            Err(e) => {
                error!("Failed to fetch webhook {}: {}", webhook_id, e);
                None
            }
        }
    }
}

#[async_trait]
impl Connector for DiscordConnector {
    async fn connect(&self) -> DiscordResult<Arc<dyn RemotePlatform>> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let mut client = self.build_client(ready_tx).await?;

        let http = client.http.clone();
        let shard_manager = client.shard_manager.clone();

        let mut runner = tokio::spawn(async move {
            let result = client.start().await;
            if let Err(ref e) = result {
                error!("Discord client error: {}", e);
            }
            result
        });

        tokio::select! {
            biased;
            finished = &mut runner => return Err(startup_failure(finished)),
            ready = ready_rx => {
                if ready.is_err() {
                    // The handler went away with the client; report why.
                    return Err(startup_failure((&mut runner).await));
                }
            }
            _ = tokio::time::sleep(READY_TIMEOUT) => {
                warn!("Discord did not become ready within {:?}", READY_TIMEOUT);
                shard_manager.shutdown_all().await;
                return Err(DiscordError::StartupTimeout);
            }
        }

        let webhook = self.resolve_webhook(&http).await;
        Ok(Arc::new(DiscordPlatform::new(http, shard_manager, webhook)))
    }
}

/// Why the client stopped before `Ready`.
fn startup_failure(finished: Result<serenity::Result<()>, JoinError>) -> DiscordError {
    match finished {
        Ok(Ok(())) => DiscordError::ConnectionClosed,
        Ok(Err(e)) => DiscordError::from_startup(e),
        Err(e) => {
            error!("Discord client task failed: {}", e);
            DiscordError::ConnectionClosed
        }
    }
}
