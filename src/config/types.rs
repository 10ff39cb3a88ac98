//! Configuration type definitions.

use std::time::Duration;

use serde::Deserialize;

/// Default Challonge REST endpoint.
pub const DEFAULT_CHALLONGE_BASE_URL: &str = "https://api.challonge.com/v1";

/// Default delay between two reads of the inbound event queue.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub challonge: ChallongeConfig,
    pub poll: Option<PollConfig>,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// The bot's own user id. Taken from the gateway Ready event when unset.
    pub bot_id: Option<u64>,
}

/// Challonge API access.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallongeConfig {
    pub api_key: String,
    pub base_url: Option<String>,
}

/// Poll loop settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    pub interval_ms: Option<u64>,
}

impl Config {
    /// Challonge base URL without a trailing slash.
    pub fn challonge_base_url(&self) -> String {
        self.challonge
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_CHALLONGE_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn poll_interval(&self) -> Duration {
        let ms = self
            .poll
            .as_ref()
            .and_then(|p| p.interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        Duration::from_millis(ms)
    }
}

/// Mention tokens for a bot user id: `<@1234>` and the nickname form
/// `<@!1234>` some clients still send.
pub fn mention_tokens(bot_id: u64) -> Vec<String> {
    vec![format!("<@{}>", bot_id), format!("<@!{}>", bot_id)]
}

#[cfg(test)]
pub(crate) fn make_test_config() -> Config {
    Config {
        discord: DiscordConfig {
            token: "original_token".to_string(),
            bot_id: Some(42),
        },
        challonge: ChallongeConfig {
            api_key: "challonge_key".to_string(),
            base_url: None,
        },
        poll: None,
    }
}
