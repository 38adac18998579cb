//! Shared types used across the application.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Avatar service used for player heads in embeds and webhook personas.
pub const AVATAR_SITE: &str = "https://mc-heads.net/avatar";

/// A player connected to the host.
///
/// Participants belong to the host roster; the bridge only ever reads
/// snapshots of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "uuid")]
    pub unique_id: Uuid,
    #[serde(default = "default_online")]
    pub is_online: bool,
}

fn default_online() -> bool {
    true
}

impl Participant {
    pub fn new(display_name: impl Into<String>, unique_id: Uuid) -> Self {
        Self {
            display_name: display_name.into(),
            unique_id,
            is_online: true,
        }
    }

    /// Avatar URL for this player's head.
    pub fn avatar_url(&self) -> String {
        format!("{}/{}", AVATAR_SITE, self.unique_id)
    }

    /// Same player, by identity rather than by field equality.
    pub fn is_same(&self, other: &Participant) -> bool {
        self.unique_id == other.unique_id
    }
}

/// Where a formatted message should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayTarget {
    /// A Discord channel, by id.
    Channel(u64),
    /// The host's broadcast-to-all-players primitive.
    HostBroadcast,
}

impl std::fmt::Display for RelayTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Channel(id) => write!(f, "channel {}", id),
            Self::HostBroadcast => f.write_str("host broadcast"),
        }
    }
}

/// How host chat is presented on Discord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStyle {
    /// Webhook messages that carry the player's name and avatar.
    Modern,
    /// Plain bot messages.
    #[default]
    Classic,
}
