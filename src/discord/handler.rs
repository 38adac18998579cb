//! Gateway event handling.
//!
//! Turns serenity callbacks into [`InboundEvent`]s on the remote stream. The
//! handler never does relay work itself.

use std::sync::Mutex;

use serenity::all::{Command, Interaction};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::bridge::dispatch::{EventSender, Stream};
use crate::common::messages::{InboundEvent, RemoteMessage};
use crate::discord::commands::{create_commands, slash_command};
use crate::discord::resolver::{with_attachments, MessageNames, TextResolver};

/// Discord event handler.
pub struct GatewayHandler {
    events: EventSender,
    resolver: TextResolver,
    /// Fired on the first `Ready`.
    ready_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl GatewayHandler {
    pub fn new(events: EventSender, ready_tx: oneshot::Sender<()>) -> Self {
        Self {
            events,
            resolver: TextResolver::new(),
            ready_tx: Mutex::new(Some(ready_tx)),
        }
    }

    fn signal_ready(&self) {
        let ready_tx = self.ready_tx.lock().ok().and_then(|mut tx| tx.take());
        if let Some(tx) = ready_tx {
            // Nobody waits any more once startup timed out.
            let _ = tx.send(());
        }
    }
}

#[async_trait]
impl EventHandler for GatewayHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);

        match Command::set_global_commands(&ctx.http, create_commands()).await {
            Ok(commands) => debug!("Registered {} slash commands", commands.len()),
            Err(e) => error!("Failed to register slash commands: {}", e),
        }

        self.signal_ready();
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore our own messages
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }

        // Ignore bots and webhooks, including our own persona messages
        if msg.author.bot || msg.webhook_id.is_some() {
            return;
        }

        // Only handle guild (server) messages
        if msg.guild_id.is_none() {
            return;
        }

        let content = with_attachments(
            msg.content.trim(),
            msg.attachments.iter().map(|a| a.url.as_str()),
        );
        if content.is_empty() {
            return;
        }

        let names = MessageNames {
            cache: &ctx.cache,
            message: &msg,
        };
        let content = self.resolver.to_plain_text(&content, &names);

        // Effective display name
        let author = msg
            .member
            .as_ref()
            .and_then(|m| m.nick.clone())
            .unwrap_or_else(|| msg.author.display_name().to_string());

        // Each gateway event runs in its own task, so the Remote stream is
        // ordered by submission, not by gateway arrival.
        self.events.submit(
            Stream::Remote,
            InboundEvent::RemoteMessage(RemoteMessage {
                author,
                content,
                channel_id: msg.channel_id.get(),
            }),
        );
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            debug!("Received /{} from {}", command.data.name, command.user.name);
            self.events
                .submit(Stream::Remote, InboundEvent::SlashCommand(slash_command(&command)));
        }
    }
}
