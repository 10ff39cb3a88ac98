//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// A failed read against the tournament API.
///
/// Every variant keeps the resource path that was requested so log lines
/// can say which call in a chain broke.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request for '{path}' failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request for '{path}' returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("Could not decode '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Path of the resource that failed.
    pub fn path(&self) -> &str {
        match self {
            Self::Transport { path, .. } | Self::Status { path, .. } | Self::Decode { path, .. } => {
                path
            }
        }
    }
}

/// Failure while building a command response.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Open match {match_id} in tournament {tournament_id} has no {slot}")]
    MissingPlayer {
        tournament_id: String,
        match_id: String,
        slot: &'static str,
    },
}

/// Chat transport errors.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Failed to send message to channel {channel_id}: {source}")]
    SendFailed {
        channel_id: u64,
        #[source]
        source: serenity::Error,
    },
}

/// Result type alias for tournament API reads.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for command handling.
pub type CommandResult<T> = std::result::Result<T, CommandError>;
