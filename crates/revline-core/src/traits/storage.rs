// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::analytics::LeadRecord;
use crate::error::RevlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ActivitySummary, FollowUp, Lead, LeadFilter, LeadStats, LeadStatus, Operator, Reply,
};

/// Adapter for storage and persistence backends.
///
/// Leads are the source of truth for the whole service: everything else
/// (notifications, reminders) is derived from what this adapter returns.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), RevlineError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RevlineError>;

    // --- Lead operations ---

    /// Persists a new lead.
    async fn insert_lead(&self, lead: &Lead) -> Result<(), RevlineError>;

    /// Fetches a lead by id.
    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, RevlineError>;

    /// Lists leads newest first.
    async fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>, RevlineError>;

    /// Inbox counters by status and category.
    async fn lead_stats(&self) -> Result<LeadStats, RevlineError>;

    /// Sets a lead's status. Returns `false` if the lead does not exist.
    async fn update_lead_status(&self, id: &str, status: LeadStatus)
    -> Result<bool, RevlineError>;

    /// Deletes a lead and its replies. Returns `false` if the lead does not exist.
    async fn delete_lead(&self, id: &str) -> Result<bool, RevlineError>;

    // --- Reply operations ---

    /// Stores a reply and marks its lead `Replied` atomically.
    ///
    /// Returns `false` without writing anything when the lead does not exist.
    async fn record_reply(&self, reply: &Reply) -> Result<bool, RevlineError>;

    /// Lists replies for a lead, newest first.
    async fn list_replies(&self, lead_id: &str) -> Result<Vec<Reply>, RevlineError>;

    // --- Operator operations ---

    /// Inserts or updates an operator keyed by Telegram id.
    async fn upsert_operator(&self, operator: &Operator) -> Result<(), RevlineError>;

    /// Fetches an operator by Telegram id, active or not.
    async fn get_operator(&self, telegram_id: i64) -> Result<Option<Operator>, RevlineError>;

    /// Lists active operators, oldest first.
    async fn list_active_operators(&self) -> Result<Vec<Operator>, RevlineError>;

    /// Soft-deactivates an operator. Returns `false` if unknown.
    async fn deactivate_operator(&self, telegram_id: i64) -> Result<bool, RevlineError>;

    // --- Job queries ---

    /// Leads that need an operator's attention as of `now`.
    async fn follow_up(&self, now: DateTime<Utc>) -> Result<FollowUp, RevlineError>;

    /// Activity since `since`.
    async fn activity_since(&self, since: DateTime<Utc>) -> Result<ActivitySummary, RevlineError>;

    /// One analytics record per lead created at or after `since` (all leads for `None`), oldest first.
    async fn lead_records(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<LeadRecord>, RevlineError>;
}
