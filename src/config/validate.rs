//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Longest accepted poll tick.
const MAX_POLL_INTERVAL_MS: u64 = 60_000;

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
    if config.discord.bot_id == Some(0) {
        errors.push("discord.bot_id must be non-zero".to_string());
    }

    // Challonge
    if config.challonge.api_key.is_empty() {
        errors.push("challonge.api_key is required".to_string());
    }
    if let Some(ref url) = config.challonge.base_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(format!(
                "challonge.base_url '{}' must start with http:// or https://",
                url
            ));
        }
    }

    // Poll loop
    if let Some(ms) = config.poll.as_ref().and_then(|p| p.interval_ms) {
        if ms == 0 || ms > MAX_POLL_INTERVAL_MS {
            errors.push(format!(
                "poll.interval_ms must be between 1 and {} (got {})",
                MAX_POLL_INTERVAL_MS, ms
            ));
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
