//! Configuration type definitions.

use serde::Deserialize;

use crate::common::types::MessageStyle;

/// Default address the host shim connects to.
pub const DEFAULT_HOST_LISTEN: &str = "127.0.0.1:25585";

/// Default activity text shown under the bot's name.
pub const DEFAULT_ACTIVITY_MESSAGE: &str = "Minecraft Server";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub filters: Option<FiltersConfig>,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// ONLINE, IDLE, DO_NOT_DISTURB or INVISIBLE.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub activity: ActivityConfig,
    /// Channel that carries the bridged chat and server notices.
    #[serde(default)]
    pub log_channel_id: Option<u64>,
    /// Webhook used by the "modern" message style.
    #[serde(default)]
    pub webhook_id: Option<u64>,
    #[serde(default)]
    pub message_style: MessageStyle,
    #[serde(default = "default_true")]
    pub allow_mentions: bool,
}

/// Bot activity shown in the member list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityConfig {
    /// playing, watching, listening or competing.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Host shim listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_host_listen")]
    pub listen: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            listen: default_host_listen(),
        }
    }
}

/// Operator-supplied message texts and formats.
///
/// Formats support `%user`, `%message` and `%time`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesConfig {
    #[serde(default)]
    pub server_start: Option<String>,
    #[serde(default)]
    pub server_stop: Option<String>,
    #[serde(default = "default_player_join")]
    pub player_join: Option<String>,
    #[serde(default = "default_player_leave")]
    pub player_leave: Option<String>,
    /// Format for Discord messages broadcast on the host.
    #[serde(default = "default_discord_to_host")]
    pub discord_to_host: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            server_start: None,
            server_stop: None,
            player_join: default_player_join(),
            player_leave: default_player_leave(),
            discord_to_host: default_discord_to_host(),
        }
    }
}

/// Message filtering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Patterns blocking host -> Discord messages.
    #[serde(default)]
    pub host_to_discord: Option<Vec<String>>,
    /// Patterns blocking Discord -> host messages.
    #[serde(default)]
    pub discord_to_host: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

fn default_host_listen() -> String {
    DEFAULT_HOST_LISTEN.to_string()
}

fn default_player_join() -> Option<String> {
    Some("%user joined the server".to_string())
}

fn default_player_leave() -> Option<String> {
    Some("%user left the server".to_string())
}

fn default_discord_to_host() -> String {
    "[Discord] %user: %message".to_string()
}
