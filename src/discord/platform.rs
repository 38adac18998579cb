//! Remote platform capability set.
//!
//! The relay only talks to Discord through [`RemotePlatform`], which keeps
//! serenity out of the relay logic. [`DiscordPlatform`] is the real
//! implementation backed by serenity's HTTP client and shard manager.

use std::sync::Arc;

use serenity::all::{
    ChannelId, CreateAllowedMentions, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, ExecuteWebhook, Http, InteractionId,
    ShardManager, Webhook,
};
use serenity::async_trait;

use crate::bridge::formatter::{truncate_message, DISCORD_MESSAGE_LIMIT};
use crate::common::error::{DiscordError, DiscordResult};
use crate::common::messages::CommandOrigin;
use crate::common::types::RelayTarget;
use crate::discord::embed::Embed;

/// Name and avatar a webhook message is posted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Operations the relay needs from the chat platform.
#[async_trait]
pub trait RemotePlatform: Send + Sync {
    async fn send_message(
        &self,
        target: RelayTarget,
        content: &str,
        allow_mentions: bool,
    ) -> DiscordResult<()>;

    async fn send_embed(&self, target: RelayTarget, embed: Embed) -> DiscordResult<()>;

    /// Post through the webhook under someone else's name.
    async fn send_as(&self, persona: &Persona, content: &str, allow_mentions: bool)
        -> DiscordResult<()>;

    /// Reply to a command, visible to everyone in the channel.
    async fn reply(&self, origin: &CommandOrigin, embed: Embed) -> DiscordResult<()>;

    /// Reply only the invoker can see.
    async fn reply_ephemeral(&self, origin: &CommandOrigin, content: &str) -> DiscordResult<()>;

    /// Remove the response previously sent for `origin`.
    async fn delete_reply(&self, origin: &CommandOrigin) -> DiscordResult<()>;

    /// Whether [`RemotePlatform::send_as`] can be used.
    fn supports_personas(&self) -> bool;

    /// Tear the gateway connection down.
    async fn shutdown(&self);
}

/// Serenity-backed platform.
pub struct DiscordPlatform {
    http: Arc<Http>,
    shard_manager: Arc<ShardManager>,
    webhook: Option<Webhook>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>, shard_manager: Arc<ShardManager>, webhook: Option<Webhook>) -> Self {
        Self {
            http,
            shard_manager,
            webhook,
        }
    }

    fn channel(target: RelayTarget) -> DiscordResult<ChannelId> {
        match target {
            RelayTarget::Channel(id) => Ok(ChannelId::new(id)),
            other => Err(DiscordError::UnsupportedTarget(other.to_string())),
        }
    }
}

/// Mentions are parsed normally unless pings are disabled, in which case
/// nothing in the message may ping.
fn mentions_policy(allow_mentions: bool) -> Option<CreateAllowedMentions> {
    (!allow_mentions).then(CreateAllowedMentions::new)
}

#[async_trait]
impl RemotePlatform for DiscordPlatform {
    async fn send_message(
        &self,
        target: RelayTarget,
        content: &str,
        allow_mentions: bool,
    ) -> DiscordResult<()> {
        let channel = Self::channel(target)?;
        let mut message = CreateMessage::new().content(truncate_message(content, DISCORD_MESSAGE_LIMIT));
        if let Some(policy) = mentions_policy(allow_mentions) {
            message = message.allowed_mentions(policy);
        }
        channel.send_message(&self.http, message).await?;
        Ok(())
    }

    async fn send_embed(&self, target: RelayTarget, embed: Embed) -> DiscordResult<()> {
        let channel = Self::channel(target)?;
        let message = CreateMessage::new()
            .embed(embed.to_create_embed())
            .allowed_mentions(CreateAllowedMentions::new());
        channel.send_message(&self.http, message).await?;
        Ok(())
    }

    async fn send_as(
        &self,
        persona: &Persona,
        content: &str,
        allow_mentions: bool,
    ) -> DiscordResult<()> {
        let webhook = self.webhook.as_ref().ok_or(DiscordError::WebhookUnavailable)?;

        let mut builder = ExecuteWebhook::new()
            .content(truncate_message(content, DISCORD_MESSAGE_LIMIT))
            .username(&persona.name);
        if let Some(ref avatar) = persona.avatar_url {
            builder = builder.avatar_url(avatar);
        }
        if let Some(policy) = mentions_policy(allow_mentions) {
            builder = builder.allowed_mentions(policy);
        }

        webhook.execute(&self.http, false, builder).await?;
        Ok(())
    }

    async fn reply(&self, origin: &CommandOrigin, embed: Embed) -> DiscordResult<()> {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new().embed(embed.to_create_embed()),
        );
        self.http
            .create_interaction_response(
                InteractionId::new(origin.interaction_id),
                &origin.token,
                &response,
                Vec::new(),
            )
            .await?;
        Ok(())
    }

    async fn reply_ephemeral(&self, origin: &CommandOrigin, content: &str) -> DiscordResult<()> {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true),
        );
        self.http
            .create_interaction_response(
                InteractionId::new(origin.interaction_id),
                &origin.token,
                &response,
                Vec::new(),
            )
            .await?;
        Ok(())
    }

    async fn delete_reply(&self, origin: &CommandOrigin) -> DiscordResult<()> {
        self.http
            .delete_original_interaction_response(&origin.token)
            .await?;
        Ok(())
    }

    fn supports_personas(&self) -> bool {
        self.webhook.is_some()
    }

    async fn shutdown(&self) {
        self.shard_manager.shutdown_all().await;
    }
}
