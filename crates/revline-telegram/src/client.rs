// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! teloxide-backed [`ChatMessenger`].

use async_trait::async_trait;
use revline_config::model::TelegramConfig;
use revline_core::types::{AdapterType, ButtonAction, HealthStatus, Keyboard};
use revline_core::{ChatMessenger, PluginAdapter, RevlineError};
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, Recipient,
};
use tracing::debug;

/// Thin wrapper over a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    /// Builds a client from config. Requires `telegram.bot_token`.
    pub fn new(config: &TelegramConfig) -> Result<Self, RevlineError> {
        let token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| RevlineError::Config("telegram.bot_token is required".into()))?;

        let mut bot = Bot::new(token);
        if let Some(api_url) = config.api_url.as_deref() {
            let url = reqwest::Url::parse(api_url).map_err(|e| {
                RevlineError::Config(format!("telegram.api_url `{api_url}` is invalid: {e}"))
            })?;
            bot = bot.set_api_url(url);
        }
        Ok(Self { bot })
    }

    /// The underlying teloxide bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

/// Converts a transport-neutral keyboard into Telegram markup.
///
/// URL buttons whose target does not parse are dropped.
pub fn to_markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    let rows = keyboard.into_iter().map(|row| {
        row.into_iter()
            .filter_map(|button| match button.action {
                ButtonAction::Callback(data) => {
                    Some(InlineKeyboardButton::callback(button.text, data))
                }
                ButtonAction::Url(url) => match reqwest::Url::parse(&url) {
                    Ok(url) => Some(InlineKeyboardButton::url(button.text, url)),
                    Err(e) => {
                        debug!(url = %url, error = %e, "dropping button with invalid url");
                        None
                    }
                },
            })
            .collect::<Vec<_>>()
    });
    InlineKeyboardMarkup::new(rows)
}

#[async_trait]
impl PluginAdapter for TelegramClient {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Messenger
    }

    async fn health_check(&self) -> Result<HealthStatus, RevlineError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RevlineError> {
        debug!("Telegram client shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChatMessenger for TelegramClient {
    async fn send_html(
        &self,
        chat_id: i64,
        html: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), RevlineError> {
        let request = self
            .bot
            .send_message(Recipient::Id(ChatId(chat_id)), html)
            .parse_mode(ParseMode::Html);
        let result = match keyboard.filter(|k| !k.is_empty()) {
            Some(keyboard) => request.reply_markup(to_markup(keyboard)).await,
            None => request.await,
        };
        result.map_err(|e| RevlineError::Channel {
            message: format!("failed to send Telegram message to {chat_id}: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), RevlineError> {
        let request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        let result = match text {
            Some(text) => request.text(text).await,
            None => request.await,
        };
        result.map_err(|e| RevlineError::Channel {
            message: format!("failed to answer callback query: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(())
    }
}
