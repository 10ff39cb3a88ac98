//! Shared types used across the application.

/// Discord channel identifier.
pub type ChannelId = u64;

/// One inbound chat event as seen by the router.
///
/// Either field may be missing: presence updates, joins and similar events
/// carry no text, and some carry no channel. The router skips those.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    pub text: Option<String>,
    pub channel: Option<ChannelId>,
}

impl InboundEvent {
    /// A text message posted to a channel.
    pub fn message(channel: ChannelId, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            channel: Some(channel),
        }
    }
}
