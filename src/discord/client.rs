//! Discord gateway client.
//!
//! Serenity delivers gateway events on its own tasks. They are forwarded
//! into an unbounded channel here and only drained when the poll loop asks
//! for the next batch, so command handling never runs concurrently.

use std::time::Duration;

use backon::BackoffBuilder;
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::bot::EventSource;
use crate::common::types::InboundEvent;

/// Gateway events the bot cares about.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    /// Bot connected; carries its own user id.
    Ready { bot_id: u64, name: String },
    Message { author_id: u64, event: InboundEvent },
}

impl GatewayEvent {
    fn from_message(message: &Message) -> Self {
        let text = (!message.content.is_empty()).then(|| message.content.clone());
        Self::Message {
            author_id: message.author.id.get(),
            event: InboundEvent {
                text,
                channel: Some(message.channel_id.get()),
            },
        }
    }
}

struct GatewayEvents {
    events_tx: mpsc::UnboundedSender<GatewayEvent>,
}

#[async_trait]
impl EventHandler for GatewayEvents {
    async fn ready(&self, _context: Context, ready: Ready) {
        let event = GatewayEvent::Ready {
            bot_id: ready.user.id.get(),
            name: ready.user.name.clone(),
        };
        if let Err(error) = self.events_tx.send(event) {
            warn!("Failed to process discord event: {}", error);
        }
    }

    async fn message(&self, _context: Context, message: Message) {
        if let Err(error) = self.events_tx.send(GatewayEvent::from_message(&message)) {
            warn!("Failed to process discord event: {}", error);
        }
    }
}

async fn build_client(
    token: &str,
    events_tx: mpsc::UnboundedSender<GatewayEvent>,
) -> anyhow::Result<Client> {
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let client = Client::builder(token, intents)
        .event_handler(GatewayEvents { events_tx })
        .await?;
    Ok(client)
}

/// Owns the serenity client and keeps it connected.
pub struct DiscordGateway {
    client: Option<Client>,
    token: String,
    events_tx: mpsc::UnboundedSender<GatewayEvent>,
}

impl DiscordGateway {
    /// Build the client. Returns the gateway plus the receiving end of its
    /// event stream and the REST handle used for replies.
    pub async fn connect(
        token: &str,
    ) -> anyhow::Result<(Self, DiscordEvents, std::sync::Arc<serenity::http::Http>)> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let client = build_client(token, events_tx.clone()).await?;
        let http = client.http.clone();

        let gateway = Self {
            client: Some(client),
            token: token.to_string(),
            events_tx,
        };
        Ok((gateway, DiscordEvents::new(events_rx), http))
    }

    /// Run until shutdown, reconnecting with backoff when the client fails.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let shard_manager = self.client.as_ref().map(|c| c.shard_manager.clone());

        tokio::select! {
            _ = Self::run_connection(&mut self.client, &self.token, &self.events_tx) => {},
            _ = async {
                loop {
                    if shutdown_rx.changed().await.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                if let Some(ref manager) = shard_manager {
                    info!("Initiating graceful Discord shutdown...");
                    manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                }
            } => {}
        }
        info!("Discord task ended");
    }

    async fn run_connection(
        client: &mut Option<Client>,
        token: &str,
        events_tx: &mpsc::UnboundedSender<GatewayEvent>,
    ) {
        /// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
        fn discord_backoff() -> impl Iterator<Item = Duration> {
            backon::ExponentialBuilder::default()
                .with_min_delay(Duration::from_secs(5))
                .with_max_delay(Duration::from_secs(300))
                .with_factor(1.1)
                .with_jitter()
                .without_max_times()
                .build()
        }

        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut active = match client.take() {
                Some(client) => client,
                None => match build_client(token, events_tx.clone()).await {
                    Ok(client) => {
                        backoff = discord_backoff();
                        client
                    }
                    Err(e) => {
                        error!("Failed to rebuild Discord client: {}", e);
                        let delay = backoff.next().unwrap_or(Duration::from_secs(300));
                        warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                        sleep(delay).await;
                        continue;
                    }
                },
            };

            match active.start().await {
                Ok(()) => {
                    info!("Discord client disconnected normally");
                    break;
                }
                Err(e) => {
                    error!("Discord client error: {}", e);
                    let delay = backoff.next().unwrap_or(Duration::from_secs(300));
                    warn!(
                        "Discord disconnected. Reconnecting in {:.1}s...",
                        delay.as_secs_f64()
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Buffered gateway events, drained once per poll tick.
pub struct DiscordEvents {
    events_rx: mpsc::UnboundedReceiver<GatewayEvent>,
    bot_id: Option<u64>,
}

impl DiscordEvents {
    fn new(events_rx: mpsc::UnboundedReceiver<GatewayEvent>) -> Self {
        Self {
            events_rx,
            bot_id: None,
        }
    }

    /// Use a configured bot id instead of waiting for Ready.
    pub fn with_bot_id(mut self, bot_id: u64) -> Self {
        self.bot_id = Some(bot_id);
        self
    }

    /// Wait for the Ready event and return the bot's own user id.
    ///
    /// Messages that arrive before Ready are dropped.
    pub async fn wait_for_ready(&mut self, limit: Duration) -> Option<u64> {
        let wait = async {
            while let Some(event) = self.events_rx.recv().await {
                if let GatewayEvent::Ready { bot_id, name } = event {
                    info!("Discord bot connected as {} ({})", name, bot_id);
                    return Some(bot_id);
                }
            }
            None
        };

        let bot_id = timeout(limit, wait).await.ok().flatten()?;
        self.bot_id = Some(bot_id);
        Some(bot_id)
    }

    /// Drain everything currently queued.
    fn drain(&mut self) -> Vec<InboundEvent> {
        let mut batch = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                GatewayEvent::Ready { bot_id, name } => {
                    info!("Discord bot connected as {}", name);
                    self.bot_id = Some(bot_id);
                }
                GatewayEvent::Message { author_id, event } => {
                    if Some(author_id) == self.bot_id {
                        continue;
                    }
                    batch.push(event);
                }
            }
        }
        batch
    }
}

#[async_trait]
impl EventSource for DiscordEvents {
    async fn read_events(&mut self) -> Vec<InboundEvent> {
        let batch = self.drain();
        if !batch.is_empty() {
            debug!("Drained {} Discord messages", batch.len());
        }
        batch
    }
}
