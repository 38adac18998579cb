//! Message relay between the host and Discord.
//!
//! Every inbound event goes through [`Relay::relay_inbound`], which decides
//! what (if anything) to send and where. Exactly one outbound call is made per
//! event at most.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::bridge::filter::{FilterDirection, MessageFilter};
use crate::bridge::formatter::{FormatContext, MessageFormatter};
use crate::bridge::mention::MentionResolver;
use crate::common::error::DiscordResult;
use crate::common::messages::{
    ChatMessage, CommandOrigin, DispatchKind, InboundEvent, LifecycleKind, PresenceKind, RelayOutcome,
    RemoteMessage, SkipReason, SlashCommand,
};
use crate::common::types::{MessageStyle, Participant, RelayTarget};
use crate::config::types::Config;
use crate::discord::commands::{PLAYER_LIST_COMMAND, PLAYER_LIST_UNAVAILABLE};
use crate::discord::embed::{Embed, COLOR_GOLD, COLOR_GREEN, COLOR_RED};
use crate::discord::platform::{Persona, RemotePlatform};
use crate::discord::session::Session;
use crate::host::gateway::{HostBroadcast, HostGateway};

/// How long the ephemeral failure reply stays visible.
pub const EPHEMERAL_REPLY_TTL: Duration = Duration::from_secs(5);

/// Relay behaviour taken from configuration.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Channel carrying bridged chat and notices.
    pub log_channel: Option<u64>,
    pub style: MessageStyle,
    pub allow_mentions: bool,
    pub server_start: Option<String>,
    pub server_stop: Option<String>,
    pub player_join: Option<String>,
    pub player_leave: Option<String>,
    pub discord_to_host: String,
}

impl RelaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            log_channel: config.discord.log_channel_id,
            style: config.discord.message_style,
            allow_mentions: config.discord.allow_mentions,
            server_start: config.messages.server_start.clone(),
            server_stop: config.messages.server_stop.clone(),
            player_join: config.messages.player_join.clone(),
            player_leave: config.messages.player_leave.clone(),
            discord_to_host: config.messages.discord_to_host.clone(),
        }
    }
}

/// Forwards events between the host and Discord.
pub struct Relay {
    session: Arc<Session>,
    host: Arc<dyn HostGateway>,
    resolver: MentionResolver,
    filter: MessageFilter,
    settings: RelaySettings,
    last_lifecycle: Mutex<Option<LifecycleKind>>,
}

impl Relay {
    pub fn new(
        session: Arc<Session>,
        host: Arc<dyn HostGateway>,
        filter: MessageFilter,
        settings: RelaySettings,
    ) -> Self {
        Self {
            session,
            host,
            resolver: MentionResolver::new(),
            filter,
            settings,
            last_lifecycle: Mutex::new(None),
        }
    }

    /// The last lifecycle notice that was relayed, if any.
    pub fn last_lifecycle(&self) -> Option<LifecycleKind> {
        self.last_lifecycle.lock().map(|kind| *kind).unwrap_or(None)
    }

    /// Handle one inbound event.
    pub async fn relay_inbound(&self, event: InboundEvent) -> RelayOutcome {
        match event {
            InboundEvent::ChatMessage(chat) => self.relay_chat(chat).await,
            InboundEvent::SlashCommand(command) => self.relay_command(command).await,
            InboundEvent::Lifecycle(kind) => self.relay_lifecycle(kind).await,
            InboundEvent::Presence { participant, kind } => {
                self.relay_presence(participant, kind).await
            }
            InboundEvent::RemoteMessage(message) => self.relay_to_host(message).await,
        }
    }

    /// Host chat -> Discord.
    async fn relay_chat(&self, chat: ChatMessage) -> RelayOutcome {
        if chat.raw_text.trim().is_empty() {
            return RelayOutcome::Skipped(SkipReason::Empty);
        }
        if self
            .filter
            .should_filter(FilterDirection::HostToDiscord, &chat.raw_text)
        {
            info!("FILTERED Host -> Discord: <{}> {}", chat.author.display_name, chat.raw_text);
            return RelayOutcome::Skipped(SkipReason::Filtered);
        }

        let (platform, target) = match self.remote().await {
            Ok(remote) => remote,
            Err(reason) => return RelayOutcome::Skipped(reason),
        };

        // A roster we cannot read simply means nobody can be mentioned.
        let mut roster = self.host.roster().unwrap_or_default();
        roster.retain(|p| p.is_online);
        let mentioned = self.resolver.resolve(&chat.raw_text, &roster);

        if !mentioned.is_empty() {
            let names: Vec<&str> = mentioned.iter().map(|p| p.display_name.as_str()).collect();
            info!(
                "Host -> Discord [{}] (mentions {}): {}",
                target,
                names.join(", "),
                chat.text
            );
            let embed = mention_embed(&chat, &mentioned);
            return outcome(
                DispatchKind::MentionedChat,
                target,
                platform.send_embed(target, embed).await,
            );
        }

        info!("Host -> Discord [{}]: {}", target, chat.text);

        if self.settings.style == MessageStyle::Modern && platform.supports_personas() {
            let persona = Persona {
                name: chat.author.display_name.clone(),
                avatar_url: Some(chat.author.avatar_url()),
            };
            return outcome(
                DispatchKind::PlainChat,
                target,
                platform
                    .send_as(&persona, &chat.raw_text, self.settings.allow_mentions)
                    .await,
            );
        }

        let content = format!("**{}**: {}", chat.author.display_name, chat.raw_text);
        outcome(
            DispatchKind::PlainChat,
            target,
            platform
                .send_message(target, &content, self.settings.allow_mentions)
                .await,
        )
    }

    /// Slash command from Discord, answered at its origin.
    async fn relay_command(&self, command: SlashCommand) -> RelayOutcome {
        if command.name != PLAYER_LIST_COMMAND {
            debug!("Ignoring unknown command /{} {}", command.name, command.args.join(" "));
            return RelayOutcome::Skipped(SkipReason::UnknownCommand);
        }

        let Some(platform) = self.ready_platform().await else {
            return RelayOutcome::Skipped(SkipReason::NotReady);
        };
        let target = RelayTarget::Channel(command.origin.channel_id);

        info!("/{} command from {}", command.name, command.origin.user);

        match self.host.roster() {
            Ok(roster) => {
                let online: Vec<&Participant> = roster.iter().filter(|p| p.is_online).collect();
                outcome(
                    DispatchKind::PlayerList,
                    target,
                    platform.reply(&command.origin, player_list_embed(&online)).await,
                )
            }
            Err(e) => {
                error!("Cannot process /{} command: {}", command.name, e);
                let sent = platform
                    .reply_ephemeral(&command.origin, PLAYER_LIST_UNAVAILABLE)
                    .await;
                if sent.is_ok() {
                    schedule_reply_removal(platform, command.origin);
                }
                outcome(DispatchKind::CommandFailure, target, sent)
            }
        }
    }

    /// Server start/stop notice.
    async fn relay_lifecycle(&self, kind: LifecycleKind) -> RelayOutcome {
        if let Ok(mut last) = self.last_lifecycle.lock() {
            *last = Some(kind);
        }

        let message = match kind {
            LifecycleKind::Start => self.settings.server_start.as_deref(),
            LifecycleKind::Stop => self.settings.server_stop.as_deref(),
        };
        let Some(message) = message.filter(|m| !m.is_empty()) else {
            debug!("No {:?} message configured", kind);
            return RelayOutcome::Skipped(SkipReason::Empty);
        };

        let (platform, target) = match self.remote().await {
            Ok(remote) => remote,
            Err(reason) => return RelayOutcome::Skipped(reason),
        };

        info!("Host -> Discord [{}] ({:?}): {}", target, kind, message);
        outcome(
            DispatchKind::Lifecycle(kind),
            target,
            platform
                .send_message(target, message, self.settings.allow_mentions)
                .await,
        )
    }

    /// Player join/leave notice.
    async fn relay_presence(&self, participant: Participant, kind: PresenceKind) -> RelayOutcome {
        let (format, color) = match kind {
            PresenceKind::Joined => (self.settings.player_join.as_deref(), COLOR_GREEN),
            PresenceKind::Left => (self.settings.player_leave.as_deref(), COLOR_RED),
        };
        let Some(format) = format.filter(|f| !f.is_empty()) else {
            return RelayOutcome::Skipped(SkipReason::Empty);
        };

        let (platform, target) = match self.remote().await {
            Ok(remote) => remote,
            Err(reason) => return RelayOutcome::Skipped(reason),
        };

        let text = MessageFormatter::new(format)
            .format(&FormatContext::new(&participant.display_name, ""));
        info!("Host -> Discord [{}]: {}", target, text);

        let embed = Embed::new()
            .author(text, Some(participant.avatar_url()))
            .color(color);
        outcome(
            DispatchKind::Presence(kind),
            target,
            platform.send_embed(target, embed).await,
        )
    }

    /// Discord chat -> host broadcast. No mention resolution on this side.
    async fn relay_to_host(&self, message: RemoteMessage) -> RelayOutcome {
        if Some(message.channel_id) != self.settings.log_channel {
            return RelayOutcome::Skipped(SkipReason::UnbridgedChannel);
        }
        if message.content.trim().is_empty() {
            warn!("Empty message received from Discord");
            return RelayOutcome::Skipped(SkipReason::Empty);
        }

        let formatted = MessageFormatter::new(&self.settings.discord_to_host)
            .format(&FormatContext::new(&message.author, &message.content));

        if self
            .filter
            .should_filter(FilterDirection::DiscordToHost, &formatted)
        {
            info!("FILTERED Discord -> Host: {}", formatted);
            return RelayOutcome::Skipped(SkipReason::Filtered);
        }

        info!("Discord -> Host: {}", formatted);

        let broadcast = HostBroadcast {
            author: message.author,
            message: message.content,
            formatted,
        };
        match self.host.broadcast(broadcast).await {
            Ok(()) => RelayOutcome::Dispatched(DispatchKind::HostBroadcast, RelayTarget::HostBroadcast),
            Err(e) => {
                warn!("Dropping Discord message - {}", e);
                RelayOutcome::Skipped(SkipReason::HostUnavailable)
            }
        }
    }

    async fn ready_platform(&self) -> Option<Arc<dyn RemotePlatform>> {
        let platform = self.session.ready_platform().await;
        if platform.is_none() {
            warn!("Discord bot is not ready - dropping message");
        }
        platform
    }

    /// Ready platform plus the log channel, or the reason there is none.
    async fn remote(&self) -> Result<(Arc<dyn RemotePlatform>, RelayTarget), SkipReason> {
        let Some(channel) = self.settings.log_channel else {
            debug!("No log channel configured - dropping message");
            return Err(SkipReason::NoTarget);
        };
        let platform = self.ready_platform().await.ok_or(SkipReason::NotReady)?;
        Ok((platform, RelayTarget::Channel(channel)))
    }
}

/// Delete the reply to `origin` once [`EPHEMERAL_REPLY_TTL`] has passed.
fn schedule_reply_removal(platform: Arc<dyn RemotePlatform>, origin: CommandOrigin) {
    tokio::spawn(async move {
        tokio::time::sleep(EPHEMERAL_REPLY_TTL).await;
        match platform.delete_reply(&origin).await {
            Ok(()) => debug!("Removed ephemeral reply after {:?}", EPHEMERAL_REPLY_TTL),
            Err(e) => error!("Failed to remove ephemeral reply: {}", e),
        }
    });
}

fn outcome(kind: DispatchKind, target: RelayTarget, result: DiscordResult<()>) -> RelayOutcome {
    match result {
        Ok(()) => RelayOutcome::Dispatched(kind, target),
        Err(e) => {
            error!("Failed to send to Discord ({}): {}", target, e);
            RelayOutcome::Failed(e.to_string())
        }
    }
}

/// Chat line that pings players, highlighted as its own embed.
fn mention_embed(chat: &ChatMessage, mentioned: &[Participant]) -> Embed {
    let names: Vec<String> = mentioned
        .iter()
        .map(|p| format!("@{}", p.display_name))
        .collect();

    Embed::new()
        .author(chat.author.display_name.clone(), Some(chat.author.avatar_url()))
        .description(chat.raw_text.clone())
        .color(COLOR_GOLD)
        .field("Mentioned", names.join(", "), false)
}

/// The `/playerlist` answer.
fn player_list_embed(online: &[&Participant]) -> Embed {
    let embed = Embed::new().title("Online Players").color(COLOR_GREEN);

    if online.is_empty() {
        return embed.description("There are currently no players online.");
    }

    let names: Vec<&str> = online.iter().map(|p| p.display_name.as_str()).collect();
    embed.description(format!(
        "There are currently {} players online.\n{}",
        online.len(),
        names.join("\n")
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::common::error::{HostError, HostResult};
    use crate::discord::session::tests::{Call, FakeConnector, RecordingPlatform};
    use serenity::async_trait;

    const LOG_CHANNEL: u64 = 42;

    /// Host with a fixed roster that records broadcasts.
    #[derive(Default)]
    pub struct FakeHost {
        pub roster: Option<Vec<Participant>>,
        pub broadcasts: std::sync::Mutex<Vec<HostBroadcast>>,
    }

    #[async_trait]
    impl HostGateway for FakeHost {
        fn roster(&self) -> HostResult<Vec<Participant>> {
            self.roster.clone().ok_or(HostError::Unavailable)
        }

        async fn broadcast(&self, broadcast: HostBroadcast) -> HostResult<()> {
            if self.roster.is_none() {
                return Err(HostError::Unavailable);
            }
            self.broadcasts.lock().unwrap().push(broadcast);
            Ok(())
        }
    }

    pub fn alice() -> Participant {
        Participant::new("alice", Uuid::from_u128(1))
    }

    pub fn bob() -> Participant {
        Participant::new("bob", Uuid::from_u128(2))
    }

    pub fn settings() -> RelaySettings {
        RelaySettings {
            log_channel: Some(LOG_CHANNEL),
            style: MessageStyle::Classic,
            allow_mentions: false,
            server_start: Some("Server started".to_string()),
            server_stop: None,
            player_join: Some("%user joined the server".to_string()),
            player_leave: Some(String::new()),
            discord_to_host: "[Discord] %user: %message".to_string(),
        }
    }

    pub struct Harness {
        pub relay: Relay,
        pub platform: Arc<RecordingPlatform>,
        pub host: Arc<FakeHost>,
    }

    pub async fn harness_with(
        platform: RecordingPlatform,
        roster: Option<Vec<Participant>>,
        settings: RelaySettings,
        ready: bool,
    ) -> Harness {
        let platform = Arc::new(platform);
        let session = Arc::new(Session::new(Arc::new(FakeConnector::new(platform.clone()))));
        if ready {
            session.start().await.unwrap();
        }
        let host = Arc::new(FakeHost {
            roster,
            ..FakeHost::default()
        });
        let relay = Relay::new(session, host.clone(), MessageFilter::default(), settings);
        Harness {
            relay,
            platform,
            host,
        }
    }

    pub async fn harness() -> Harness {
        harness_with(
            RecordingPlatform::default(),
            Some(vec![alice(), bob()]),
            settings(),
            true,
        )
        .await
    }

    pub fn chat(author: Participant, text: &str) -> InboundEvent {
        InboundEvent::ChatMessage(ChatMessage {
            author,
            text: text.to_string(),
            raw_text: text.to_string(),
        })
    }

    fn command(name: &str) -> InboundEvent {
        InboundEvent::SlashCommand(SlashCommand {
            name: name.to_string(),
            args: Vec::new(),
            origin: CommandOrigin {
                interaction_id: 7,
                token: "token".to_string(),
                channel_id: 99,
                user: "discord_user".to_string(),
            },
        })
    }

    #[tokio::test]
    async fn test_plain_chat_dispatches_once() {
        let h = harness().await;

        let outcome = h.relay.relay_inbound(chat(alice(), "hello")).await;

        assert_eq!(
            outcome,
            RelayOutcome::Dispatched(DispatchKind::PlainChat, RelayTarget::Channel(LOG_CHANNEL))
        );
        assert_eq!(
            h.platform.calls(),
            vec![Call::Message {
                target: RelayTarget::Channel(LOG_CHANNEL),
                content: "**alice**: hello".to_string(),
                allow_mentions: false,
            }]
        );
    }

    #[tokio::test]
    async fn test_mention_dispatches_only_mentioned_variant() {
        let h = harness().await;

        let outcome = h.relay.relay_inbound(chat(alice(), "hello @bob")).await;

        assert_eq!(
            outcome,
            RelayOutcome::Dispatched(DispatchKind::MentionedChat, RelayTarget::Channel(LOG_CHANNEL))
        );
        let calls = h.platform.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Embed { embed, .. } => {
                assert_eq!(embed.description.as_deref(), Some("hello @bob"));
                assert_eq!(embed.fields[0].value, "@bob");
                assert_eq!(embed.color, Some(COLOR_GOLD));
            }
            other => panic!("expected mention embed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mention_by_id_lists_each_player_once() {
        let h = harness().await;
        let text = format!("@bob @{{{}}} and @alice", bob().unique_id);

        h.relay.relay_inbound(chat(alice(), &text)).await;

        match &h.platform.calls()[0] {
            Call::Embed { embed, .. } => assert_eq!(embed.fields[0].value, "@bob, @alice"),
            other => panic!("expected mention embed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_mention_is_plain_chat() {
        let h = harness().await;

        let outcome = h.relay.relay_inbound(chat(alice(), "hi @nobody")).await;

        assert!(matches!(
            outcome,
            RelayOutcome::Dispatched(DispatchKind::PlainChat, _)
        ));
    }

    #[tokio::test]
    async fn test_decorated_text_is_not_relayed() {
        let h = harness().await;
        let event = InboundEvent::ChatMessage(ChatMessage {
            author: alice(),
            text: "[Admin] <alice> hi".to_string(),
            raw_text: "hi".to_string(),
        });

        h.relay.relay_inbound(event).await;

        assert_eq!(
            h.platform.calls(),
            vec![Call::Message {
                target: RelayTarget::Channel(LOG_CHANNEL),
                content: "**alice**: hi".to_string(),
                allow_mentions: false,
            }]
        );
    }

    #[tokio::test]
    async fn test_offline_player_is_not_mentioned() {
        let mut offline_bob = bob();
        offline_bob.is_online = false;
        let h = harness_with(
            RecordingPlatform::default(),
            Some(vec![alice(), offline_bob]),
            settings(),
            true,
        )
        .await;

        let outcome = h.relay.relay_inbound(chat(alice(), "hello @bob")).await;

        assert!(matches!(
            outcome,
            RelayOutcome::Dispatched(DispatchKind::PlainChat, _)
        ));
        assert!(matches!(h.platform.calls()[0], Call::Message { .. }));
    }

    #[tokio::test]
    async fn test_modern_style_uses_persona() {
        let mut settings = settings();
        settings.style = MessageStyle::Modern;
        let h = harness_with(
            RecordingPlatform::with_personas(),
            Some(vec![alice()]),
            settings,
            true,
        )
        .await;

        h.relay.relay_inbound(chat(alice(), "hello")).await;

        assert_eq!(
            h.platform.calls(),
            vec![Call::Persona {
                persona: Persona {
                    name: "alice".to_string(),
                    avatar_url: Some(alice().avatar_url()),
                },
                content: "hello".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_modern_style_without_webhook_falls_back() {
        let mut settings = settings();
        settings.style = MessageStyle::Modern;
        let h = harness_with(RecordingPlatform::default(), Some(vec![]), settings, true).await;

        h.relay.relay_inbound(chat(alice(), "hello")).await;

        assert!(matches!(h.platform.calls()[0], Call::Message { .. }));
    }

    #[tokio::test]
    async fn test_not_ready_is_noop() {
        let h = harness_with(
            RecordingPlatform::default(),
            Some(vec![alice()]),
            settings(),
            false,
        )
        .await;

        let outcome = h.relay.relay_inbound(chat(alice(), "hello")).await;

        assert_eq!(outcome, RelayOutcome::Skipped(SkipReason::NotReady));
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_player_list_replies_to_origin() {
        let h = harness().await;

        let outcome = h.relay.relay_inbound(command("playerlist")).await;

        assert_eq!(
            outcome,
            RelayOutcome::Dispatched(DispatchKind::PlayerList, RelayTarget::Channel(99))
        );
        match &h.platform.calls()[0] {
            Call::Reply {
                interaction_id,
                embed,
            } => {
                assert_eq!(*interaction_id, 7);
                assert_eq!(embed.title.as_deref(), Some("Online Players"));
                assert_eq!(
                    embed.description.as_deref(),
                    Some("There are currently 2 players online.\nalice\nbob")
                );
            }
            other => panic!("expected reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_player_list_empty_roster() {
        let h = harness_with(RecordingPlatform::default(), Some(vec![]), settings(), true).await;

        h.relay.relay_inbound(command("playerlist")).await;

        match &h.platform.calls()[0] {
            Call::Reply { embed, .. } => assert_eq!(
                embed.description.as_deref(),
                Some("There are currently no players online.")
            ),
            other => panic!("expected reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_player_list_skips_offline_players() {
        let mut offline = bob();
        offline.is_online = false;
        let h = harness_with(
            RecordingPlatform::default(),
            Some(vec![alice(), offline]),
            settings(),
            true,
        )
        .await;

        h.relay.relay_inbound(command("playerlist")).await;

        match &h.platform.calls()[0] {
            Call::Reply { embed, .. } => assert_eq!(
                embed.description.as_deref(),
                Some("There are currently 1 players online.\nalice")
            ),
            other => panic!("expected reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_player_list_host_unavailable_is_ephemeral() {
        let h = harness_with(RecordingPlatform::default(), None, settings(), true).await;

        let outcome = h.relay.relay_inbound(command("playerlist")).await;

        assert!(matches!(
            outcome,
            RelayOutcome::Dispatched(DispatchKind::CommandFailure, _)
        ));
        assert_eq!(
            h.platform.calls(),
            vec![Call::Ephemeral {
                interaction_id: 7,
                content: PLAYER_LIST_UNAVAILABLE.to_string(),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ephemeral_reply_is_removed_after_ttl() {
        let h = harness_with(RecordingPlatform::default(), None, settings(), true).await;
        let deletes = |calls: Vec<Call>| {
            calls
                .into_iter()
                .filter(|call| matches!(call, Call::DeleteReply { interaction_id: 7 }))
                .count()
        };

        h.relay.relay_inbound(command("playerlist")).await;

        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert_eq!(deletes(h.platform.calls()), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(deletes(h.platform.calls()), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(deletes(h.platform.calls()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_player_list_reply_is_not_removed() {
        let h = harness().await;

        h.relay.relay_inbound(command("playerlist")).await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(h.platform.calls().len(), 1);
        assert!(matches!(h.platform.calls()[0], Call::Reply { .. }));
    }

    #[tokio::test]
    async fn test_unknown_command_is_skipped() {
        let h = harness().await;

        let outcome = h.relay.relay_inbound(command("tps")).await;

        assert_eq!(outcome, RelayOutcome::Skipped(SkipReason::UnknownCommand));
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lifecycle_messages() {
        let h = harness().await;

        let start = h.relay.relay_inbound(InboundEvent::Lifecycle(LifecycleKind::Start)).await;
        // No stop message configured
        let stop = h.relay.relay_inbound(InboundEvent::Lifecycle(LifecycleKind::Stop)).await;

        assert_eq!(
            start,
            RelayOutcome::Dispatched(
                DispatchKind::Lifecycle(LifecycleKind::Start),
                RelayTarget::Channel(LOG_CHANNEL)
            )
        );
        assert_eq!(stop, RelayOutcome::Skipped(SkipReason::Empty));
        assert_eq!(h.platform.calls().len(), 1);
        assert_eq!(h.relay.last_lifecycle(), Some(LifecycleKind::Stop));
    }

    #[tokio::test]
    async fn test_presence_join_and_disabled_leave() {
        let h = harness().await;

        let joined = h
            .relay
            .relay_inbound(InboundEvent::Presence {
                participant: bob(),
                kind: PresenceKind::Joined,
            })
            .await;
        let left = h
            .relay
            .relay_inbound(InboundEvent::Presence {
                participant: bob(),
                kind: PresenceKind::Left,
            })
            .await;

        assert!(matches!(joined, RelayOutcome::Dispatched(DispatchKind::Presence(PresenceKind::Joined), _)));
        assert_eq!(left, RelayOutcome::Skipped(SkipReason::Empty));
        match &h.platform.calls()[0] {
            Call::Embed { embed, .. } => {
                assert_eq!(embed.author.as_ref().unwrap().name, "bob joined the server");
            }
            other => panic!("expected embed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remote_message_broadcasts_to_host() {
        let h = harness().await;

        let outcome = h
            .relay
            .relay_inbound(InboundEvent::RemoteMessage(RemoteMessage {
                author: "Herobrine".to_string(),
                content: "hi @alice".to_string(),
                channel_id: LOG_CHANNEL,
            }))
            .await;

        assert_eq!(
            outcome,
            RelayOutcome::Dispatched(DispatchKind::HostBroadcast, RelayTarget::HostBroadcast)
        );
        let broadcasts = h.host.broadcasts.lock().unwrap();
        assert_eq!(broadcasts[0].formatted, "[Discord] Herobrine: hi @alice");
        assert!(h.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remote_message_from_other_channel_is_skipped() {
        let h = harness().await;

        let outcome = h
            .relay
            .relay_inbound(InboundEvent::RemoteMessage(RemoteMessage {
                author: "Herobrine".to_string(),
                content: "hi".to_string(),
                channel_id: 1,
            }))
            .await;

        assert_eq!(outcome, RelayOutcome::Skipped(SkipReason::UnbridgedChannel));
        assert!(h.host.broadcasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_message_host_unavailable() {
        let h = harness_with(RecordingPlatform::default(), None, settings(), true).await;

        let outcome = h
            .relay
            .relay_inbound(InboundEvent::RemoteMessage(RemoteMessage {
                author: "Herobrine".to_string(),
                content: "hi".to_string(),
                channel_id: LOG_CHANNEL,
            }))
            .await;

        assert_eq!(outcome, RelayOutcome::Skipped(SkipReason::HostUnavailable));
    }

    #[tokio::test]
    async fn test_filtered_chat_is_skipped() {
        let platform = Arc::new(RecordingPlatform::default());
        let session = Arc::new(Session::new(Arc::new(FakeConnector::new(platform.clone()))));
        session.start().await.unwrap();
        let host = Arc::new(FakeHost {
            roster: Some(vec![alice()]),
            ..FakeHost::default()
        });
        let filter = MessageFilter::new(Some(vec!["^!".to_string()]), None);
        let relay = Relay::new(session, host, filter, settings());

        let outcome = relay.relay_inbound(chat(alice(), "!secret")).await;

        assert_eq!(outcome, RelayOutcome::Skipped(SkipReason::Filtered));
        assert!(platform.calls().is_empty());
    }
}
