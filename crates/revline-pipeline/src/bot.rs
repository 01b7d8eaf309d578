// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram bot dispatch: commands, visitor messages and operator buttons.
//!
//! Operators are the active entries of the operator table. Visitors writing
//! to the bot in a private chat create GENERAL leads; everything else is
//! operator tooling.

use std::sync::Arc;

use chrono::Utc;
use revline_core::analytics::AnalyticsPeriod;
use revline_core::types::{
    BotEvent, ChatUser, KIND_KEY, LeadFilter, Metadata, NewLead, Permission, TELEGRAM_ID_KEY,
};
use revline_core::{ChatMessenger, LeadCategory, LeadStatus, RevlineError};
use revline_telegram::format;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analytics::Analytics;
use crate::operators::{OperatorDirectory, broadcast};
use crate::service::{LeadService, parse_status};

/// How many leads `/new` lists.
const NEW_LIST_LIMIT: u32 = 10;

/// Canned answers offered as quick replies on Telegram leads.
pub fn quick_reply_text(template: &str) -> Option<&'static str> {
    match template {
        "received" => Some(
            "Thank you for your message! We have received it and will get back to you shortly.",
        ),
        "processing" => Some(
            "Your request is being processed. A specialist will contact you with the details soon.",
        ),
        "completed" => Some(
            "Your request has been completed. Thank you for choosing Revline!",
        ),
        _ => None,
    }
}

/// Period named in a command argument or button; anything unrecognised means a week.
fn period_arg(raw: &str) -> AnalyticsPeriod {
    raw.trim().parse().unwrap_or_default()
}

/// A parsed inline button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction<'a> {
    Noop,
    Status { id: &'a str, status: &'a str },
    Reply { id: &'a str },
    QuickReply { id: &'a str, template: &'a str },
    View { id: &'a str },
    Analytics { period: &'a str },
    Unknown,
}

impl<'a> CallbackAction<'a> {
    pub fn parse(data: &'a str) -> Self {
        let mut parts = data.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("noop"), None, None) => Self::Noop,
            (Some("status"), Some(id), Some(status)) => Self::Status { id, status },
            (Some("reply"), Some(id), None) => Self::Reply { id },
            (Some("quick_reply"), Some(id), Some(template)) => Self::QuickReply { id, template },
            (Some("view"), Some(id), None) => Self::View { id },
            (Some("analytics"), Some(period), None) => Self::Analytics { period },
            _ => Self::Unknown,
        }
    }
}

/// Handles webhook events for the lead bot.
pub struct BotHandler {
    service: Arc<LeadService>,
    operators: OperatorDirectory,
    analytics: Analytics,
    messenger: Arc<dyn ChatMessenger>,
    public_url: String,
}

impl BotHandler {
    pub fn new(service: Arc<LeadService>, messenger: Arc<dyn ChatMessenger>, public_url: &str) -> Self {
        let operators = OperatorDirectory::new(Arc::clone(service.storage()));
        let analytics = Analytics::new(Arc::clone(service.storage()));
        Self {
            service,
            operators,
            analytics,
            messenger,
            public_url: public_url.to_string(),
        }
    }

    pub async fn handle(&self, event: BotEvent) -> Result<(), RevlineError> {
        match event {
            BotEvent::Command {
                chat_id,
                from,
                name,
                args,
                ..
            } => self.on_command(chat_id, &from, &name, &args).await,
            BotEvent::Text {
                chat_id,
                private,
                from,
                text,
            } => self.on_text(chat_id, private, &from, &text).await,
            BotEvent::Callback {
                callback_id,
                chat_id,
                from,
                data,
            } => {
                self.on_callback(&callback_id, chat_id.unwrap_or(from.id), &from, &data)
                    .await
            }
        }
    }

    async fn send(&self, chat_id: i64, html: &str) -> Result<(), RevlineError> {
        self.messenger.send_html(chat_id, html, None).await
    }

    async fn on_command(
        &self,
        chat_id: i64,
        from: &ChatUser,
        name: &str,
        args: &str,
    ) -> Result<(), RevlineError> {
        let is_operator = self.operators.is_operator(from.id).await?;
        debug!(command = name, user_id = from.id, is_operator, "bot command");
        match name {
            "start" => {
                self.send(chat_id, &format::welcome_text(&from.first_name, is_operator))
                    .await
            }
            "stats" | "new" if !is_operator => {
                self.send(chat_id, &format::operators_only_text()).await
            }
            "stats" => {
                let stats = self.service.storage().lead_stats().await?;
                self.send(chat_id, &format::stats_text(&stats)).await
            }
            "new" => {
                let filter = LeadFilter {
                    status: Some(LeadStatus::New),
                    limit: Some(NEW_LIST_LIMIT),
                    ..Default::default()
                };
                let leads = self.service.storage().list_leads(&filter).await?;
                let (html, keyboard) = format::lead_list(&leads);
                self.messenger.send_html(chat_id, &html, Some(keyboard)).await
            }
            "analytics" => {
                if !self.operators.has_permission(from.id, Permission::Analytics).await? {
                    return self.send(chat_id, &format::superadmins_only_text()).await;
                }
                self.send_analytics(chat_id, period_arg(args)).await
            }
            _ => self.send(chat_id, &format::help_text(is_operator)).await,
        }
    }

    async fn send_analytics(&self, chat_id: i64, period: AnalyticsPeriod) -> Result<(), RevlineError> {
        let summary = self.analytics.summary(period, Utc::now()).await?;
        let html = format::analytics_text(&summary.stats, &summary.conversion, &summary.response);
        self.messenger
            .send_html(chat_id, &html, Some(format::analytics_keyboard(period)))
            .await
    }

    /// A visitor's private message becomes a GENERAL lead.
    async fn on_text(
        &self,
        chat_id: i64,
        private: bool,
        from: &ChatUser,
        text: &str,
    ) -> Result<(), RevlineError> {
        if !private {
            return Ok(());
        }
        if self.operators.is_operator(from.id).await? {
            debug!(user_id = from.id, "ignoring free text from operator");
            return Ok(());
        }

        let mut metadata = Metadata::new();
        metadata.insert(KIND_KEY.into(), Value::String("telegram".into()));
        metadata.insert(TELEGRAM_ID_KEY.into(), Value::from(chat_id));
        if let Some(username) = &from.username {
            metadata.insert("username".into(), Value::String(username.clone()));
        }
        let name = match &from.username {
            Some(username) => format!("{} (@{username})", from.first_name),
            None => from.first_name.clone(),
        };

        let submission = self
            .service
            .submit(NewLead {
                name,
                email: None,
                phone: None,
                body: text.to_string(),
                category: LeadCategory::General,
                metadata,
            })
            .await?;
        drop(submission.deliveries);
        let lead = submission.lead;

        if let Err(e) = self.send(chat_id, &format::message_received_text()).await {
            warn!(lead_id = %lead.id, error = %e, "failed to acknowledge visitor message");
        }
        let (html, keyboard) = format::operator_notice(&lead);
        let reached = broadcast(
            self.service.storage().as_ref(),
            self.messenger.as_ref(),
            &html,
            Some(&keyboard),
            None,
        )
        .await?;
        info!(lead_id = %lead.id, operators = reached.len(), "telegram lead announced");
        Ok(())
    }

    async fn on_callback(
        &self,
        callback_id: &str,
        chat_id: i64,
        from: &ChatUser,
        data: &str,
    ) -> Result<(), RevlineError> {
        let action = CallbackAction::parse(data);
        if action == CallbackAction::Noop {
            return self.messenger.answer_callback(callback_id, None).await;
        }
        if !self.operators.is_operator(from.id).await? {
            return self
                .messenger
                .answer_callback(callback_id, Some("No access"))
                .await;
        }

        let toast = match action {
            CallbackAction::Status { id, status } => self.change_status(id, status, from).await?,
            CallbackAction::Reply { id } => match self.service.storage().get_lead(id).await? {
                Some(lead) => {
                    let (html, keyboard) = format::reply_prompt(&lead, &self.public_url);
                    self.messenger.send_html(chat_id, &html, Some(keyboard)).await?;
                    None
                }
                None => Some("Request not found"),
            },
            CallbackAction::QuickReply { id, template } => {
                self.quick_reply(id, template).await?
            }
            CallbackAction::View { id } => match self.service.detail(id).await {
                Ok(detail) => {
                    let (html, keyboard) = format::lead_details(&detail.lead, &detail.replies);
                    self.messenger.send_html(chat_id, &html, Some(keyboard)).await?;
                    None
                }
                Err(RevlineError::NotFound { .. }) => Some("Request not found"),
                Err(e) => return Err(e),
            },
            CallbackAction::Analytics { period } => {
                if self.operators.has_permission(from.id, Permission::Analytics).await? {
                    self.send_analytics(chat_id, period_arg(period)).await?;
                    None
                } else {
                    Some("No access")
                }
            }
            CallbackAction::Noop | CallbackAction::Unknown => None,
        };
        self.messenger.answer_callback(callback_id, toast).await
    }

    async fn change_status(
        &self,
        id: &str,
        raw_status: &str,
        from: &ChatUser,
    ) -> Result<Option<&'static str>, RevlineError> {
        let Ok(status) = parse_status(raw_status) else {
            return Ok(Some("Invalid status"));
        };
        let lead = match self.service.set_status(id, status).await {
            Ok(lead) => lead,
            Err(RevlineError::NotFound { .. }) => return Ok(Some("Request not found")),
            Err(e) => return Err(e),
        };

        let html = format::status_changed(&lead, status, &from.first_name);
        broadcast(
            self.service.storage().as_ref(),
            self.messenger.as_ref(),
            &html,
            None,
            Some(from.id),
        )
        .await?;
        Ok(Some("Status updated"))
    }

    async fn quick_reply(&self, id: &str, template: &str) -> Result<Option<&'static str>, RevlineError> {
        let Some(text) = quick_reply_text(template) else {
            return Ok(Some("Unknown template"));
        };
        match self.service.reply(id, text, true).await {
            Ok(outcome) if outcome.forwarded => Ok(Some("Reply sent")),
            Ok(_) => Ok(Some("Reply saved but not delivered")),
            Err(RevlineError::NotFound { .. }) => Ok(Some("Request not found")),
            Err(e) => Err(e),
        }
    }
}
