//! Outbound Discord messages.

use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::{CreateAllowedMentions, CreateMessage};
use serenity::http::Http;
use serenity::model::id::ChannelId as DiscordChannelId;
use tracing::debug;

use crate::bot::formatter::split_message;
use crate::bot::ChatSink;
use crate::common::error::ChatError;
use crate::common::types::ChannelId;

/// Discord rejects messages longer than this.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Sends replies over the Discord REST API.
pub struct DiscordSender {
    http: Arc<Http>,
}

impl DiscordSender {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Build one outgoing message. Mentions in the text never ping anyone.
fn reply_message(content: impl Into<String>) -> CreateMessage {
    CreateMessage::new()
        .content(content)
        .allowed_mentions(CreateAllowedMentions::new())
}

#[async_trait]
impl ChatSink for DiscordSender {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), ChatError> {
        let target = DiscordChannelId::new(channel);

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            target
                .send_message(&self.http, reply_message(chunk))
                .await
                .map_err(|source| ChatError::SendFailed {
                    channel_id: channel,
                    source,
                })?;
        }

        debug!("Replied in channel {}", channel);
        Ok(())
    }
}
