//! Configuration parsing, environment overrides and validation.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

pub use parser::load_config;
pub use types::*;

use crate::common::error::ConfigError;

/// Load the config file, apply environment overrides, then validate.
pub fn load_and_validate(path: &str) -> Result<Config, ConfigError> {
    let config = env::apply_env_overrides(load_config(path)?);

    let empty = env::check_empty_env_vars();
    if !empty.is_empty() {
        tracing::warn!("Environment variables set but empty: {}", empty.join(", "));
    }

    validate::validate_config(&config)?;
    Ok(config)
}
