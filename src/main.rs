//! Smashbot - Challonge tournament bot for Discord
//!
//! Answers mentions with tournament listings and open matches pulled from
//! the Challonge API.

mod bot;
mod challonge;
mod common;
mod config;
mod discord;

use std::time::Duration;

use anyhow::{Context as _, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use bot::Router;
use challonge::ChallongeClient;
use config::{env::get_config_path, load_and_validate, mention_tokens};
use discord::{DiscordGateway, DiscordSender};

/// How long to wait for the gateway Ready event when no bot id is configured.
const READY_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Smashbot v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        error!("See smashbot.conf.example for reference.");
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Challonge API: {}", config.challonge_base_url());
    info!("  Poll interval: {:?}", config.poll_interval());

    let challonge = ChallongeClient::from_config(&config).context("Failed to build HTTP client")?;

    // ============================================================
    // Connect to Discord
    // ============================================================
    let (gateway, mut events, http) = DiscordGateway::connect(&config.discord.token).await?;
    let sender = DiscordSender::new(http);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut discord_task = tokio::spawn(gateway.run(shutdown_rx.clone()));

    let bot_id = match config.discord.bot_id {
        Some(id) => {
            events = events.with_bot_id(id);
            id
        }
        None => {
            info!("Waiting for Discord to report the bot's user id...");
            match events.wait_for_ready(READY_TIMEOUT).await {
                Some(id) => id,
                None => {
                    error!(
                        "Timed out waiting for Discord Ready ({}s) - set discord.bot_id or check the token",
                        READY_TIMEOUT.as_secs()
                    );
                    let _ = shutdown_tx.send(true);
                    anyhow::bail!("Discord did not become ready");
                }
            }
        }
    };

    // ============================================================
    // Poll loop
    // ============================================================
    let router = Router::new(mention_tokens(bot_id), &challonge, &sender);
    info!("Smashbot connected and running as {}", router.mentions()[0]);

    tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
        _ = &mut discord_task => {
            warn!("Discord task exited");
        }
        _ = router.run(&mut events, config.poll_interval(), shutdown_rx) => {}
    }

    if let Err(e) = shutdown_tx.send(true) {
        debug!("Shutdown channel closed (tasks already exited): {}", e);
    }
    if !discord_task.is_finished() {
        match tokio::time::timeout(Duration::from_secs(5), discord_task).await {
            Ok(Ok(())) => info!("Discord disconnected gracefully"),
            Ok(Err(e)) => warn!("Discord task panicked: {}", e),
            Err(_) => warn!("Discord shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
