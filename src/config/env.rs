//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `SMASHBOT_DISCORD_TOKEN` - Discord bot token
//! - `SMASHBOT_BOT_ID` - The bot's own Discord user id
//! - `SMASHBOT_CHALLONGE_API_KEY` - Challonge API key
//! - `SMASHBOT_CHALLONGE_BASE_URL` - Challonge API base URL
//! - `SMASHBOT_POLL_INTERVAL_MS` - Poll loop tick in milliseconds

use std::env;

use crate::config::types::{Config, PollConfig};

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "SMASHBOT";

/// Apply environment variable overrides to a config.
///
/// Lets tokens and keys stay out of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }
    if let Ok(bot_id) = env::var(format!("{}_BOT_ID", ENV_PREFIX)) {
        if let Ok(id) = bot_id.parse() {
            config.discord.bot_id = Some(id);
        }
    }

    if let Ok(key) = env::var(format!("{}_CHALLONGE_API_KEY", ENV_PREFIX)) {
        config.challonge.api_key = key;
    }
    if let Ok(url) = env::var(format!("{}_CHALLONGE_BASE_URL", ENV_PREFIX)) {
        config.challonge.base_url = Some(url);
    }

    if let Ok(interval) = env::var(format!("{}_POLL_INTERVAL_MS", ENV_PREFIX)) {
        if let Ok(ms) = interval.parse() {
            config.poll = Some(PollConfig {
                interval_ms: Some(ms),
            });
        }
    }

    config
}

/// Check if any credential environment variables are set but empty.
///
/// Returns a list of variable names that are set but empty.
pub fn check_empty_env_vars() -> Vec<String> {
    let vars = [
        format!("{}_DISCORD_TOKEN", ENV_PREFIX),
        format!("{}_CHALLONGE_API_KEY", ENV_PREFIX),
    ];

    vars.into_iter()
        .filter(|var| env::var(var).map(|v| v.is_empty()).unwrap_or(false))
        .collect()
}

/// Get the config file path from environment or use default.
///
/// Checks `SMASHBOT_CONFIG` environment variable, otherwise returns "smashbot.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "smashbot.conf".to_string())
}
