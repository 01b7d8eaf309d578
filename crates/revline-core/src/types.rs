// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by storage, notifiers, the pipeline and the gateway.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Arbitrary per-lead attributes (model, VIN, budget, channel-specific ids).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Metadata key holding the Telegram chat id a lead arrived from.
pub const TELEGRAM_ID_KEY: &str = "telegramId";

/// Metadata key distinguishing lead sources (`contact`, `partnership`, `telegram`).
pub const KIND_KEY: &str = "kind";

/// Timestamp format used for every persisted record.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Formats a UTC instant the way records are stored.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp. Any RFC 3339 instant is accepted.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Current time in storage format.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Extracts a Telegram chat id from loosely formatted input.
///
/// Takes the first `-?\d+` run, so `"chat: -100123 "` yields `-100123`.
pub fn normalize_chat_id(raw: &str) -> Option<i64> {
    static CHAT_ID: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"-?\d+").expect("chat id pattern is valid")
    });
    CHAT_ID.find(raw).and_then(|m| m.as_str().parse().ok())
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Notifier,
    Messenger,
}

/// Product line a lead belongs to.
///
/// The contact form only ever produces `Auto` or `Moto`; `General` holds
/// leads with no product line (partnerships, free-text bot messages).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadCategory {
    Auto,
    Moto,
    General,
}

/// Lifecycle state of a lead.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    InProgress,
    Replied,
    Completed,
    Archived,
}

/// A submitted contact or partnership inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub body: String,
    pub category: LeadCategory,
    pub status: LeadStatus,
    pub metadata: Metadata,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated input for a lead that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub body: String,
    pub category: LeadCategory,
    pub metadata: Metadata,
}

impl Lead {
    /// Materializes a new lead with a fresh id, status `New` and current timestamps.
    pub fn create(new: NewLead) -> Self {
        let now = now_timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            body: new.body,
            category: new.category,
            status: LeadStatus::New,
            metadata: new.metadata,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Telegram chat id captured when the lead arrived through the bot.
    ///
    /// Accepts both numeric and string encodings.
    pub fn telegram_id(&self) -> Option<i64> {
        match self.metadata.get(TELEGRAM_ID_KEY)? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Source kind recorded in metadata, if any.
    pub fn kind(&self) -> Option<&str> {
        self.metadata.get(KIND_KEY).and_then(|v| v.as_str())
    }

    /// Whether this lead came from the partnership form.
    pub fn is_partnership(&self) -> bool {
        self.kind() == Some("partnership")
    }

    /// String metadata field, if present and non-empty.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// How a reply reached the submitter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReplyChannel {
    Telegram,
    Email,
}

/// An operator's answer to a lead. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub lead_id: String,
    pub content: String,
    pub sent_via: ReplyChannel,
    #[serde(rename = "sentAt")]
    pub created_at: String,
}

impl Reply {
    pub fn create(lead_id: &str, content: &str, sent_via: ReplyChannel) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            lead_id: lead_id.to_string(),
            content: content.to_string(),
            sent_via,
            created_at: now_timestamp(),
        }
    }
}

/// A lead together with its replies, newest reply first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: Lead,
    pub replies: Vec<Reply>,
}

/// Operator tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OperatorRole {
    Admin,
    Superadmin,
}

/// A capability granted to operators through their role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Messages,
    Users,
    Settings,
    Analytics,
}

impl OperatorRole {
    /// The complete permission set for this role. Nothing else grants permissions.
    pub fn permissions(self) -> Vec<Permission> {
        match self {
            OperatorRole::Superadmin => vec![
                Permission::Messages,
                Permission::Users,
                Permission::Settings,
                Permission::Analytics,
            ],
            OperatorRole::Admin => vec![Permission::Messages],
        }
    }
}

/// A human operator identified by their Telegram user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub telegram_id: i64,
    pub name: String,
    pub role: OperatorRole,
    pub permissions: Vec<Permission>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Operator {
    /// Builds an active operator whose permissions derive from `role`.
    pub fn new(telegram_id: i64, name: &str, role: OperatorRole) -> Self {
        let now = now_timestamp();
        Self {
            telegram_id,
            name: name.to_string(),
            role,
            permissions: role.permissions(),
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Filters for listing leads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub category: Option<LeadCategory>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Inbox counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total: u64,
    pub new: u64,
    pub in_progress: u64,
    pub replied: u64,
    pub completed: u64,
    pub archived: u64,
    pub auto: u64,
    pub moto: u64,
    pub general: u64,
}

/// Leads that have waited too long for an operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowUp {
    /// NEW leads older than one hour with no replies.
    pub stale_new: Vec<Lead>,
    /// IN_PROGRESS leads not updated for a day.
    pub stale_in_progress: Vec<Lead>,
    /// Partnership leads still NEW after three days.
    pub stale_partnerships: Vec<Lead>,
}

impl FollowUp {
    pub fn is_empty(&self) -> bool {
        self.stale_new.is_empty()
            && self.stale_in_progress.is_empty()
            && self.stale_partnerships.is_empty()
    }
}

/// Activity counters for a time window, used by the daily digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub leads: u64,
    pub auto: u64,
    pub moto: u64,
    pub general: u64,
    pub partnerships: u64,
    pub replies: u64,
    pub open_new: u64,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Milliseconds until the window resets.
    pub reset_after_ms: u64,
}

/// Inline keyboard button attached to a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Callback data delivered back through the webhook.
    Callback(String),
    /// Link opened by the client.
    Url(String),
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

/// Rows of inline buttons.
pub type Keyboard = Vec<Vec<InlineButton>>;

/// The sender of a chat update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

/// A chat update reduced to what the lead pipeline acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    /// `/command args` sent in any chat.
    Command {
        chat_id: i64,
        private: bool,
        from: ChatUser,
        name: String,
        args: String,
    },
    /// Plain text message.
    Text {
        chat_id: i64,
        private: bool,
        from: ChatUser,
        text: String,
    },
    /// Inline button press.
    Callback {
        callback_id: String,
        chat_id: Option<i64>,
        from: ChatUser,
        data: String,
    },
}
