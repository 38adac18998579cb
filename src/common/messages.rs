//! Canonical message types for bridge communication.
//!
//! Every notification from either side becomes one [`InboundEvent`], and every
//! relay call reports back with a [`RelayOutcome`].

use crate::common::types::{Participant, RelayTarget};

/// A chat line written by a player on the host.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub author: Participant,
    /// Decorated text as the host renders it.
    pub text: String,
    /// Raw text the player typed.
    pub raw_text: String,
}

/// Reply handle for a slash command interaction.
#[derive(Debug, Clone)]
pub struct CommandOrigin {
    pub interaction_id: u64,
    pub token: String,
    pub channel_id: u64,
    pub user: String,
}

/// A slash command invoked on Discord.
#[derive(Debug, Clone)]
pub struct SlashCommand {
    pub name: String,
    pub args: Vec<String>,
    pub origin: CommandOrigin,
}

/// Host server lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleKind {
    Start,
    Stop,
}

/// Player join or leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceKind {
    Joined,
    Left,
}

/// A message written in a Discord channel.
#[derive(Debug, Clone)]
pub struct RemoteMessage {
    /// Sender's Discord display name.
    pub author: String,
    /// Message content with Discord markup already turned into plain text.
    pub content: String,
    pub channel_id: u64,
}

/// Everything the relay reacts to.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    ChatMessage(ChatMessage),
    SlashCommand(SlashCommand),
    Lifecycle(LifecycleKind),
    Presence {
        participant: Participant,
        kind: PresenceKind,
    },
    RemoteMessage(RemoteMessage),
}

impl InboundEvent {
    /// Short name used in log lines.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ChatMessage(_) => "chat",
            Self::SlashCommand(_) => "command",
            Self::Lifecycle(_) => "lifecycle",
            Self::Presence { .. } => "presence",
            Self::RemoteMessage(_) => "remote message",
        }
    }
}

/// What kind of outbound call a relay made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    PlainChat,
    MentionedChat,
    PlayerList,
    CommandFailure,
    Lifecycle(LifecycleKind),
    Presence(PresenceKind),
    HostBroadcast,
}

/// Why a relay call sent nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Remote session is not ready.
    NotReady,
    /// No log channel configured.
    NoTarget,
    /// Message or format is empty.
    Empty,
    /// Blocked by a filter pattern.
    Filtered,
    /// Remote message came from a channel that is not bridged.
    UnbridgedChannel,
    /// Host is not connected.
    HostUnavailable,
    UnknownCommand,
}

/// Result of handling one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Dispatched(DispatchKind, RelayTarget),
    Skipped(SkipReason),
    Failed(String),
}
