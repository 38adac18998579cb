//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `FABRICORD_DISCORD_TOKEN` - Discord bot token
//! - `FABRICORD_LOG_CHANNEL_ID` - Channel carrying the bridged chat
//! - `FABRICORD_WEBHOOK_ID` - Webhook for the modern message style
//! - `FABRICORD_HOST_LISTEN` - Address the host shim connects to

use std::env;

use tracing::warn;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "FABRICORD";

/// Apply environment variable overrides to a config.
///
/// Lets the bot token live outside the config file.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |name| env::var(name).ok())
}

fn apply_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    let var = |suffix: &str| lookup(&format!("{}_{}", ENV_PREFIX, suffix));

    if let Some(token) = var("DISCORD_TOKEN") {
        config.discord.token = token;
    }

    if let Some(id) = var("LOG_CHANNEL_ID") {
        match id.parse() {
            Ok(id) => config.discord.log_channel_id = Some(id),
            Err(_) => warn!("Ignoring {}_LOG_CHANNEL_ID: '{}' is not a channel id", ENV_PREFIX, id),
        }
    }

    if let Some(id) = var("WEBHOOK_ID") {
        match id.parse() {
            Ok(id) => config.discord.webhook_id = Some(id),
            Err(_) => warn!("Ignoring {}_WEBHOOK_ID: '{}' is not a webhook id", ENV_PREFIX, id),
        }
    }

    if let Some(listen) = var("HOST_LISTEN") {
        config.host.listen = listen;
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `FABRICORD_CONFIG`, otherwise returns "fabricord.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "fabricord.conf".to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::parser::load_config_str;

    fn make_test_config() -> Config {
        load_config_str(r#"discord { token = "original_token", log_channel_id = 1 }"#).unwrap()
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "FABRICORD");
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let result = apply_overrides_from(make_test_config(), |_| None);

        assert_eq!(result.discord.token, "original_token");
        assert_eq!(result.discord.log_channel_id, Some(1));
    }

    #[test]
    fn test_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("FABRICORD_DISCORD_TOKEN", "from_env"),
            ("FABRICORD_LOG_CHANNEL_ID", "42"),
            ("FABRICORD_HOST_LISTEN", "0.0.0.0:9000"),
        ]
        .into_iter()
        .collect();

        let result = apply_overrides_from(make_test_config(), |name| {
            vars.get(name).map(|v| v.to_string())
        });

        assert_eq!(result.discord.token, "from_env");
        assert_eq!(result.discord.log_channel_id, Some(42));
        assert_eq!(result.host.listen, "0.0.0.0:9000");
    }

    #[test]
    fn test_unparsable_id_is_ignored() {
        let result = apply_overrides_from(make_test_config(), |name| {
            (name == "FABRICORD_WEBHOOK_ID").then(|| "not-a-number".to_string())
        });

        assert_eq!(result.discord.webhook_id, None);
    }
}
