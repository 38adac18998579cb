//! Slash commands and bot presence settings.

use serenity::all::{ActivityData, CommandInteraction, CreateCommand, OnlineStatus};

use crate::common::messages::{CommandOrigin, SlashCommand};
use crate::config::types::{ActivityConfig, DEFAULT_ACTIVITY_MESSAGE};

/// Name of the online player list command.
pub const PLAYER_LIST_COMMAND: &str = "playerlist";

/// Ephemeral answer when the roster cannot be read.
pub const PLAYER_LIST_UNAVAILABLE: &str = "Sorry, I can't get the player list right now.";

/// Every slash command the bot registers.
pub fn create_commands() -> Vec<CreateCommand> {
    vec![CreateCommand::new(PLAYER_LIST_COMMAND).description("Get a list of online players")]
}

/// Turn a serenity interaction into a relay event payload.
pub fn slash_command(interaction: &CommandInteraction) -> SlashCommand {
    let args = interaction
        .data
        .options
        .iter()
        .filter_map(|option| option.value.as_str().map(str::to_string))
        .collect();

    SlashCommand {
        name: interaction.data.name.clone(),
        args,
        origin: CommandOrigin {
            interaction_id: interaction.id.get(),
            token: interaction.token.clone(),
            channel_id: interaction.channel_id.get(),
            user: interaction.user.name.clone(),
        },
    }
}

/// Map the configured status, defaulting to online.
pub fn parse_status(status: Option<&str>) -> OnlineStatus {
    match status.map(str::to_lowercase).as_deref() {
        Some("idle") => OnlineStatus::Idle,
        Some("do_not_disturb") => OnlineStatus::DoNotDisturb,
        Some("invisible") => OnlineStatus::Invisible,
        _ => OnlineStatus::Online,
    }
}

/// Map the configured activity, defaulting to "playing".
pub fn parse_activity(activity: &ActivityConfig) -> ActivityData {
    let message = activity
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_ACTIVITY_MESSAGE);

    match activity.kind.as_deref().map(str::to_lowercase).as_deref() {
        Some("watching") => ActivityData::watching(message),
        Some("listening") => ActivityData::listening(message),
        Some("competing") => ActivityData::competing(message),
        _ => ActivityData::playing(message),
    }
}
