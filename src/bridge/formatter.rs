//! Message formatting for display.
//!
//! Handles placeholder substitution in message format strings.
//! Supports placeholders: %time, %user, %message

use chrono::Local;
use fancy_regex::{Captures, Regex};

/// Discord's limit for plain message content.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Discord's limit for embed descriptions.
pub const DISCORD_EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Message formatter that substitutes placeholders in format strings.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    format: String,
    placeholder: Regex,
}

impl MessageFormatter {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            placeholder: Regex::new(r"%(time|user|message)").unwrap(),
        }
    }

    /// Format a message with the given context.
    ///
    /// - `%time` - Current time (HH:MM:SS)
    /// - `%user` - Player or Discord member name
    /// - `%message` - The actual message content
    ///
    /// Placeholders are only read from the format string, never from the
    /// substituted values.
    pub fn format(&self, ctx: &FormatContext) -> String {
        self.placeholder
            .replace_all(&self.format, |caps: &Captures| -> String {
                match &caps[1] {
                    "time" => get_time(),
                    "user" => ctx.user.clone(),
                    _ => ctx.message.clone(),
                }
            })
            .into_owned()
    }
}

/// Context for message formatting.
#[derive(Debug, Clone, Default)]
pub struct FormatContext {
    pub user: String,
    pub message: String,
}

impl FormatContext {
    pub fn new(user: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            message: message.into(),
        }
    }
}

/// Get the current time as HH:MM:SS string.
fn get_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Find the last UTF-8 char boundary at or before `byte_index` in `s`.
fn floor_char_boundary(s: &str, byte_index: usize) -> usize {
    if byte_index >= s.len() {
        return s.len();
    }
    let mut i = byte_index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Cut `message` down to at most `max_len` bytes, ending in an ellipsis when
/// something was removed. Never splits a multi-byte character.
pub fn truncate_message(message: &str, max_len: usize) -> String {
    if message.len() <= max_len {
        return message.to_string();
    }

    const ELLIPSIS: &str = "…";
    let cut = floor_char_boundary(message, max_len.saturating_sub(ELLIPSIS.len()));
    format!("{}{}", &message[..cut], ELLIPSIS)
}
