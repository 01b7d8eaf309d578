// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `revline serve` command implementation.
//!
//! Opens storage, assembles the notification channels that are configured,
//! builds the lead pipeline and serves the gateway until a shutdown signal.

use std::sync::Arc;

use revline_config::RevlineConfig;
use revline_core::{ChatMessenger, NotificationChannel, RateLimiter, RevlineError, StorageAdapter};
use revline_email::EmailNotifier;
use revline_gateway::AppState;
use revline_pipeline::{BotHandler, Fanout, JobRunner, LeadService};
use revline_storage::SqliteStorage;
use revline_telegram::{ChatRoutes, TelegramClient, TelegramNotifier};
use tracing::{info, warn};

use crate::shutdown;

/// Telegram client, or `None` when no bot token is configured.
fn telegram_messenger(config: &RevlineConfig) -> Result<Option<Arc<dyn ChatMessenger>>, RevlineError> {
    if config.telegram.bot_token.is_none() {
        warn!("telegram.bot_token is not set; Telegram notifications and the bot are disabled");
        return Ok(None);
    }
    let client: Arc<dyn ChatMessenger> = Arc::new(TelegramClient::new(&config.telegram)?);
    Ok(Some(client))
}

fn notification_channels(
    config: &RevlineConfig,
    messenger: Option<&Arc<dyn ChatMessenger>>,
) -> Result<Vec<Arc<dyn NotificationChannel>>, RevlineError> {
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

    if let Some(messenger) = messenger {
        channels.push(Arc::new(TelegramNotifier::new(
            messenger.clone(),
            ChatRoutes::from_config(&config.telegram),
            &config.server.public_url,
        )));
    }

    match EmailNotifier::from_config(&config.email)? {
        Some(email) => channels.push(Arc::new(email)),
        None => info!("email notifications disabled: no sender or recipients configured"),
    }

    Ok(channels)
}

/// Runs the server until SIGINT/SIGTERM, then checkpoints the database.
pub async fn run_serve(config: RevlineConfig) -> Result<(), RevlineError> {
    let sqlite = Arc::new(SqliteStorage::new(config.storage.clone()));
    sqlite.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = sqlite.clone();
    let rate_limiter: Arc<dyn RateLimiter> = Arc::new(sqlite.rate_limiter(&config.rate_limit)?);

    let messenger = telegram_messenger(&config)?;
    let fanout = Fanout::new(notification_channels(&config, messenger.as_ref())?);
    info!(channels = ?fanout.channel_names(), "notification channels ready");

    let public_url = config.server.public_url.as_str();
    let service = Arc::new(LeadService::new(storage.clone(), fanout, messenger.clone()));
    let jobs = JobRunner::new(storage.clone(), messenger.clone(), public_url);
    let bot = messenger
        .map(|messenger| Arc::new(BotHandler::new(service.clone(), messenger, public_url)));

    let state = AppState::new(&config, service, jobs, bot, rate_limiter);
    let cancel = shutdown::install_signal_handler();

    let served = revline_gateway::serve(&config.server, state, cancel).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "WAL checkpoint on shutdown failed");
    }
    served?;
    info!("revline serve shutdown complete");
    Ok(())
}
