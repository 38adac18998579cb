//! Discord markup to plain text.
//!
//! Messages relayed to the host cannot render Discord's `<@id>`-style
//! mentions or custom emoji, so they are rewritten into readable text first.

use fancy_regex::{Captures, Regex};
use serenity::cache::Cache;
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, RoleId, UserId};

/// Looks up display names for ids found in message markup.
pub trait NameLookup {
    fn user_name(&self, id: u64) -> Option<String>;
    fn channel_name(&self, id: u64) -> Option<String>;
    fn role_name(&self, id: u64) -> Option<String>;
}

/// Names from a received message, falling back to the gateway cache.
pub struct MessageNames<'a> {
    pub cache: &'a Cache,
    pub message: &'a Message,
}

impl NameLookup for MessageNames<'_> {
    fn user_name(&self, id: u64) -> Option<String> {
        if let Some(user) = self.message.mentions.iter().find(|u| u.id.get() == id) {
            return Some(user.display_name().to_string());
        }
        self.cache
            .user(UserId::new(id))
            .map(|user| user.display_name().to_string())
    }

    fn channel_name(&self, id: u64) -> Option<String> {
        let channel_id = ChannelId::new(id);
        self.cache.guilds().into_iter().find_map(|guild_id| {
            let guild = self.cache.guild(guild_id)?;
            guild.channels.get(&channel_id).map(|c| c.name.clone())
        })
    }

    fn role_name(&self, id: u64) -> Option<String> {
        let role_id = RoleId::new(id);
        self.cache.guilds().into_iter().find_map(|guild_id| {
            let guild = self.cache.guild(guild_id)?;
            guild.roles.get(&role_id).map(|r| r.name.clone())
        })
    }
}

/// Rewrites Discord message content for the host.
#[derive(Debug, Clone)]
pub struct TextResolver {
    /// `<@123>` or `<@!123>`.
    user_pattern: Regex,
    /// `<#123>`.
    channel_pattern: Regex,
    /// `<@&123>`.
    role_pattern: Regex,
    /// `<:name:123>` or `<a:name:123>`.
    emoji_pattern: Regex,
}

impl Default for TextResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TextResolver {
    pub fn new() -> Self {
        Self {
            user_pattern: Regex::new(r"<@!?(\d+)>").unwrap(),
            channel_pattern: Regex::new(r"<#(\d+)>").unwrap(),
            role_pattern: Regex::new(r"<@&(\d+)>").unwrap(),
            emoji_pattern: Regex::new(r"<a?:([a-zA-Z0-9_]+):\d+>").unwrap(),
        }
    }

    /// Full pipeline for a message on its way to the host.
    pub fn to_plain_text(&self, content: &str, names: &impl NameLookup) -> String {
        let text = self.resolve_unicode_emojis(content);
        let text = self.resolve_ids(&self.user_pattern, &text, "@", |id| names.user_name(id));
        let text = self.resolve_ids(&self.role_pattern, &text, "@", |id| names.role_name(id));
        let text = self.resolve_ids(&self.channel_pattern, &text, "#", |id| names.channel_name(id));
        self.resolve_custom_emojis(&text)
    }

    /// Replace `<..id>` markup with `prefix + name`, leaving unknown ids as they are.
    fn resolve_ids(
        &self,
        pattern: &Regex,
        text: &str,
        prefix: &str,
        lookup: impl Fn(u64) -> Option<String>,
    ) -> String {
        pattern
            .replace_all(text, |caps: &Captures| -> String {
                caps[1]
                    .parse::<u64>()
                    .ok()
                    .and_then(&lookup)
                    .map(|name| format!("{}{}", prefix, name))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .to_string()
    }

    /// `<:name:id>` -> `:name:`.
    pub fn resolve_custom_emojis(&self, text: &str) -> String {
        self.emoji_pattern.replace_all(text, ":$1:").to_string()
    }

    /// Unicode emoji -> `:shortcode:`, or `:name:` when there is no shortcode.
    pub fn resolve_unicode_emojis(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(ch) = rest.chars().next() {
            if ch.is_ascii() {
                result.push(ch);
                rest = &rest[1..];
                continue;
            }

            // Longest emoji sequence starting here.
            let matched = rest
                .char_indices()
                .skip(1)
                .map(|(i, _)| i)
                .chain(std::iter::once(rest.len()))
                .take(8)
                .filter_map(|end| emojis::get(&rest[..end]).map(|emoji| (end, emoji)))
                .last();

            match matched {
                Some((end, emoji)) => {
                    let alias = emoji.shortcode().unwrap_or_else(|| emoji.name());
                    result.push(':');
                    result.push_str(alias);
                    result.push(':');
                    rest = &rest[end..];
                }
                None => {
                    result.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }

        result
    }
}

/// Message text followed by its attachment URLs.
pub fn with_attachments<'a>(content: &str, attachment_urls: impl IntoIterator<Item = &'a str>) -> String {
    let mut text = content.to_string();
    for url in attachment_urls {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(url);
    }
    text
}
