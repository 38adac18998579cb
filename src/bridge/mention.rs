//! Player mention resolution.
//!
//! Finds `@name` and `@{uuid}` tokens in chat text and matches them against a
//! roster snapshot. Tokens that match nobody are ignored.

use fancy_regex::Regex;
use tracing::warn;

use crate::common::types::Participant;

/// Resolves mention tokens against a roster.
#[derive(Debug, Clone)]
pub struct MentionResolver {
    /// `@name` with a Minecraft-style player name.
    name_pattern: Regex,
    /// `@{uuid}`.
    id_pattern: Regex,
}

impl Default for MentionResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Which roster key a token is compared against.
#[derive(Debug, Clone, Copy)]
enum TokenKind {
    Name,
    Id,
}

impl MentionResolver {
    pub fn new() -> Self {
        Self {
            name_pattern: Regex::new(r"@([a-zA-Z0-9_]+)").unwrap(),
            id_pattern: Regex::new(r"@\{([0-9a-fA-F-]+)\}").unwrap(),
        }
    }

    /// Participants mentioned in `text`, in order of first mention.
    ///
    /// A participant referenced several times, or by both name and id,
    /// appears once.
    pub fn resolve(&self, text: &str, roster: &[Participant]) -> Vec<Participant> {
        if text.is_empty() || roster.is_empty() {
            return Vec::new();
        }

        let mut tokens: Vec<(usize, TokenKind, &str)> = Vec::new();
        self.collect_tokens(&self.name_pattern, TokenKind::Name, text, &mut tokens);
        self.collect_tokens(&self.id_pattern, TokenKind::Id, text, &mut tokens);
        tokens.sort_by_key(|(start, _, _)| *start);

        let mut mentioned: Vec<Participant> = Vec::new();
        for (_, kind, token) in tokens {
            let found = roster.iter().find(|p| match kind {
                TokenKind::Name => p.display_name == token,
                TokenKind::Id => p.unique_id.to_string() == token,
            });

            if let Some(participant) = found {
                if !mentioned.iter().any(|m| m.is_same(participant)) {
                    mentioned.push(participant.clone());
                }
            }
        }

        mentioned
    }

    fn collect_tokens<'t>(
        &self,
        pattern: &Regex,
        kind: TokenKind,
        text: &'t str,
        tokens: &mut Vec<(usize, TokenKind, &'t str)>,
    ) {
        for caps in pattern.captures_iter(text) {
            match caps {
                Ok(caps) => {
                    if let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) {
                        tokens.push((whole.start(), kind, token.as_str()));
                    }
                }
                Err(e) => {
                    warn!("Mention pattern failed on message: {}", e);
                    break;
                }
            }
        }
    }
}
