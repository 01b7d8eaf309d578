// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead notifications to per-category team chats.

use std::sync::Arc;

use async_trait::async_trait;
use revline_config::model::TelegramConfig;
use revline_core::types::{AdapterType, HealthStatus, normalize_chat_id};
use revline_core::{
    ChatMessenger, Lead, LeadCategory, NotificationChannel, PluginAdapter, RevlineError,
};
use tracing::debug;

use crate::format;

/// Destination chat per lead category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRoutes {
    pub auto: Option<i64>,
    pub moto: Option<i64>,
    pub general: Option<i64>,
}

impl ChatRoutes {
    /// Normalizes the configured chat ids; unparseable values count as unset.
    pub fn from_config(config: &TelegramConfig) -> Self {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(normalize_chat_id);
        Self {
            auto: parse(&config.auto_chat_id),
            moto: parse(&config.moto_chat_id),
            general: parse(&config.general_chat_id),
        }
    }

    /// Chat for `category`. GENERAL falls back to the AUTO chat.
    pub fn chat_for(&self, category: LeadCategory) -> Option<i64> {
        match category {
            LeadCategory::Auto => self.auto,
            LeadCategory::Moto => self.moto,
            LeadCategory::General => self.general.or(self.auto),
        }
    }
}

/// Posts a lead card to the chat configured for the lead's category.
pub struct TelegramNotifier {
    messenger: Arc<dyn ChatMessenger>,
    routes: ChatRoutes,
    public_url: String,
}

impl TelegramNotifier {
    pub fn new(messenger: Arc<dyn ChatMessenger>, routes: ChatRoutes, public_url: &str) -> Self {
        Self {
            messenger,
            routes,
            public_url: public_url.to_string(),
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, RevlineError> {
        if self.routes == ChatRoutes::default() {
            return Ok(HealthStatus::Degraded("no Telegram chat configured".into()));
        }
        self.messenger.health_check().await
    }

    async fn shutdown(&self) -> Result<(), RevlineError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for TelegramNotifier {
    async fn deliver(&self, lead: &Lead) -> Result<(), RevlineError> {
        let chat_id = self.routes.chat_for(lead.category).ok_or_else(|| {
            RevlineError::Config(format!(
                "no Telegram chat configured for {} leads",
                lead.category
            ))
        })?;

        let (html, keyboard) = format::lead_card(lead, &self.public_url);
        self.messenger
            .send_html(chat_id, &html, Some(keyboard))
            .await?;
        debug!(lead_id = %lead.id, chat_id, "lead card posted");
        Ok(())
    }
}
