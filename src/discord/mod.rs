//! Discord chat transport.

pub mod client;
pub mod sender;

pub use client::{DiscordEvents, DiscordGateway};
pub use sender::DiscordSender;
