//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use std::net::SocketAddr;

use fancy_regex::Regex;
use tracing::warn;

use crate::common::error::ConfigError;
use crate::common::types::MessageStyle;
use crate::config::types::Config;

const VALID_STATUSES: [&str; 4] = ["online", "idle", "do_not_disturb", "invisible"];
const VALID_ACTIVITIES: [&str; 4] = ["playing", "watching", "listening", "competing"];

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Discord
    if config.discord.token.is_empty() {
        errors.push("discord.token is required".to_string());
    }
    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }
    if config.discord.log_channel_id == Some(0) {
        errors.push("discord.log_channel_id must be non-zero".to_string());
    }
    if config.discord.webhook_id == Some(0) {
        errors.push("discord.webhook_id must be non-zero".to_string());
    }
    if let Some(ref status) = config.discord.status {
        if !VALID_STATUSES.contains(&status.to_lowercase().as_str()) {
            errors.push(format!(
                "discord.status '{}' is invalid (use: ONLINE, IDLE, DO_NOT_DISTURB, INVISIBLE)",
                status
            ));
        }
    }
    if let Some(ref kind) = config.discord.activity.kind {
        if !VALID_ACTIVITIES.contains(&kind.to_lowercase().as_str()) {
            errors.push(format!(
                "discord.activity.kind '{}' is invalid (use: playing, watching, listening, competing)",
                kind
            ));
        }
    }

    // Not fatal: the relay falls back to plain messages.
    if config.discord.message_style == MessageStyle::Modern && config.discord.webhook_id.is_none() {
        warn!("The message style is set to 'modern' but discord.webhook_id is not configured.");
    }
    if config.discord.log_channel_id.is_none() {
        warn!("discord.log_channel_id is not configured - nothing will be relayed to Discord");
    }

    // Host
    if !is_listen_address(&config.host.listen) {
        errors.push(format!(
            "host.listen '{}' must be host:port",
            config.host.listen
        ));
    }

    // Filter patterns must compile
    if let Some(ref filters) = config.filters {
        let sections = [
            ("host_to_discord", &filters.host_to_discord),
            ("discord_to_host", &filters.discord_to_host),
        ];
        for (section, patterns) in sections {
            for (i, pattern) in patterns.iter().flatten().enumerate() {
                if Regex::new(pattern).is_err() {
                    errors.push(format!(
                        "filters.{}[{}] is not a valid regex: '{}'",
                        section, i, pattern
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

/// `ip:port` or `hostname:port`. Host names are resolved when binding.
fn is_listen_address(listen: &str) -> bool {
    if listen.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match listen.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && !host.contains(':')
                && !host.contains(char::is_whitespace)
                && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::load_config_str;
    use crate::config::types::FiltersConfig;

    fn make_valid_config() -> Config {
        load_config_str(
            r#"
            discord {
                token = "valid_token_here"
                log_channel_id = 987654321
                status = "DO_NOT_DISTURB"
                activity { kind = "Playing" }
            }
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&make_valid_config()).is_ok());
    }

    #[test]
    fn test_empty_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = String::new();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("discord.token"));
    }

    #[test]
    fn test_placeholder_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = "YOUR_DISCORD_TOKEN_HERE".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("placeholder"));
    }

    #[test]
    fn test_invalid_status_fails() {
        let mut config = make_valid_config();
        config.discord.status = Some("busy".to_string());

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("discord.status"));
    }

    #[test]
    fn test_invalid_listen_address_fails() {
        let mut config = make_valid_config();
        config.host.listen = "localhost".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("host.listen"));
    }

    #[test]
    fn test_listen_accepts_host_names() {
        for listen in ["localhost:25585", "mc.example.org:25585", "0.0.0.0:25585", "[::1]:25585"] {
            let mut config = make_valid_config();
            config.host.listen = listen.to_string();

            assert!(validate_config(&config).is_ok(), "{} should be accepted", listen);
        }

        for listen in [":25585", "localhost:port", "localhost:70000", "::1:25585"] {
            let mut config = make_valid_config();
            config.host.listen = listen.to_string();

            assert!(validate_config(&config).is_err(), "{} should be rejected", listen);
        }
    }

    #[test]
    fn test_invalid_regex_filter_fails() {
        let mut config = make_valid_config();
        config.filters = Some(FiltersConfig {
            enabled: true,
            host_to_discord: Some(vec!["[invalid".to_string()]),
            discord_to_host: None,
        });

        let result = validate_config(&config);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("not a valid regex"));
    }

    #[test]
    fn test_errors_are_collected() {
        let mut config = make_valid_config();
        config.discord.token = String::new();
        config.discord.log_channel_id = Some(0);

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("discord.token"));
        assert!(message.contains("log_channel_id"));
    }
}
