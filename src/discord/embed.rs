//! Platform-neutral embed description.
//!
//! The relay builds these; the Discord adapter renders them with serenity's
//! builders.

use serenity::all::{Colour, CreateEmbed, CreateEmbedAuthor, Timestamp};

use crate::bridge::formatter::{truncate_message, DISCORD_EMBED_DESCRIPTION_LIMIT};

pub const COLOR_GREEN: u32 = 0x00FF00;
pub const COLOR_RED: u32 = 0xFF0000;
pub const COLOR_GOLD: u32 = 0xF1C40F;

/// A rich message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub author: Option<EmbedAuthor>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn author(mut self, name: impl Into<String>, icon_url: Option<String>) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            icon_url,
        });
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Render into a serenity builder, stamped with the current time.
    pub fn to_create_embed(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new().timestamp(Timestamp::now());

        if let Some(ref title) = self.title {
            embed = embed.title(title);
        }
        if let Some(ref description) = self.description {
            embed = embed.description(truncate_message(description, DISCORD_EMBED_DESCRIPTION_LIMIT));
        }
        if let Some(color) = self.color {
            embed = embed.colour(Colour::new(color));
        }
        if let Some(ref author) = self.author {
            let mut builder = CreateEmbedAuthor::new(&author.name);
            if let Some(ref icon) = author.icon_url {
                builder = builder.icon_url(icon);
            }
            embed = embed.author(builder);
        }
        for field in &self.fields {
            embed = embed.field(&field.name, &field.value, field.inline);
        }

        embed
    }
}
