//! Message filtering with regex patterns.
//!
//! Blocks spam or unwanted messages from being relayed between the host and
//! Discord.

use fancy_regex::Regex;
use tracing::warn;

use crate::config::types::FiltersConfig;

/// Direction of message flow for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDirection {
    HostToDiscord,
    DiscordToHost,
}

/// Message filter that checks messages against regex patterns.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    host_to_discord: Vec<CompiledPattern>,
    discord_to_host: Vec<CompiledPattern>,
}

/// A compiled regex pattern with its original string for debugging.
#[derive(Debug, Clone)]
struct CompiledPattern {
    original: String,
    regex: Regex,
}

impl MessageFilter {
    /// Create a new message filter from pattern strings.
    ///
    /// Invalid regex patterns are logged and skipped.
    pub fn new(host_to_discord: Option<Vec<String>>, discord_to_host: Option<Vec<String>>) -> Self {
        Self {
            host_to_discord: compile_patterns(host_to_discord.unwrap_or_default()),
            discord_to_host: compile_patterns(discord_to_host.unwrap_or_default()),
        }
    }

    /// Build the filter from config; disabled or missing filters allow everything.
    pub fn from_config(filters: Option<&FiltersConfig>) -> Self {
        match filters {
            Some(f) if f.enabled => {
                Self::new(f.host_to_discord.clone(), f.discord_to_host.clone())
            }
            _ => Self::default(),
        }
    }

    /// Returns `true` if the message matches any pattern for `direction` and
    /// should be blocked.
    pub fn should_filter(&self, direction: FilterDirection, message: &str) -> bool {
        let patterns = match direction {
            FilterDirection::HostToDiscord => &self.host_to_discord,
            FilterDirection::DiscordToHost => &self.discord_to_host,
        };

        patterns.iter().any(|p| {
            p.regex.is_match(message).unwrap_or_else(|e| {
                warn!("Regex match error for pattern '{}': {}", p.original, e);
                false
            })
        })
    }
}

fn compile_patterns(patterns: Vec<String>) -> Vec<CompiledPattern> {
    patterns
        .into_iter()
        .filter_map(|pattern| match Regex::new(&pattern) {
            Ok(regex) => Some(CompiledPattern {
                original: pattern,
                regex,
            }),
            Err(e) => {
                warn!("Invalid filter regex pattern '{}': {}", pattern, e);
                None
            }
        })
        .collect()
}
