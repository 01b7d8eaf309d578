// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use revline_config::model::{RateLimitConfig, StorageConfig};
use revline_core::analytics::LeadRecord;
use revline_core::types::{
    ActivitySummary, FollowUp, LeadFilter, LeadStats, Operator, Reply,
};
use revline_core::{
    AdapterType, HealthStatus, Lead, LeadStatus, PluginAdapter, RevlineError, StorageAdapter,
};

use crate::database::{Database, map_tr_err};
use crate::queries;
use crate::rate_limit::SqliteRateLimiter;

/// SQLite-backed storage adapter.
///
/// The database is opened, and migrated, by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Creates the adapter without touching the filesystem.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, RevlineError> {
        self.db.get().ok_or_else(|| RevlineError::Storage {
            source: "storage not initialized, call initialize() first".into(),
        })
    }

    /// A rate limiter sharing this adapter's database.
    pub fn rate_limiter(&self, config: &RateLimitConfig) -> Result<SqliteRateLimiter, RevlineError> {
        Ok(SqliteRateLimiter::new(self.db()?.clone(), config))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RevlineError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RevlineError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), RevlineError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RevlineError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RevlineError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Lead operations ---

    async fn insert_lead(&self, lead: &Lead) -> Result<(), RevlineError> {
        queries::leads::insert_lead(self.db()?, lead).await
    }

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, RevlineError> {
        queries::leads::get_lead(self.db()?, id).await
    }

    async fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>, RevlineError> {
        queries::leads::list_leads(self.db()?, filter).await
    }

    async fn lead_stats(&self) -> Result<LeadStats, RevlineError> {
        queries::leads::lead_stats(self.db()?).await
    }

    async fn update_lead_status(
        &self,
        id: &str,
        status: LeadStatus,
    ) -> Result<bool, RevlineError> {
        queries::leads::update_lead_status(self.db()?, id, status).await
    }

    async fn delete_lead(&self, id: &str) -> Result<bool, RevlineError> {
        queries::leads::delete_lead(self.db()?, id).await
    }

    // --- Reply operations ---

    async fn record_reply(&self, reply: &Reply) -> Result<bool, RevlineError> {
        queries::replies::record_reply(self.db()?, reply).await
    }

    async fn list_replies(&self, lead_id: &str) -> Result<Vec<Reply>, RevlineError> {
        queries::replies::list_replies(self.db()?, lead_id).await
    }

    // --- Operator operations ---

    async fn upsert_operator(&self, operator: &Operator) -> Result<(), RevlineError> {
        queries::operators::upsert_operator(self.db()?, operator).await
    }

    async fn get_operator(&self, telegram_id: i64) -> Result<Option<Operator>, RevlineError> {
        queries::operators::get_operator(self.db()?, telegram_id).await
    }

    async fn list_active_operators(&self) -> Result<Vec<Operator>, RevlineError> {
        queries::operators::list_active_operators(self.db()?).await
    }

    async fn deactivate_operator(&self, telegram_id: i64) -> Result<bool, RevlineError> {
        queries::operators::deactivate_operator(self.db()?, telegram_id).await
    }

    // --- Job queries ---

    async fn follow_up(&self, now: DateTime<Utc>) -> Result<FollowUp, RevlineError> {
        queries::leads::follow_up(self.db()?, now).await
    }

    async fn activity_since(&self, since: DateTime<Utc>) -> Result<ActivitySummary, RevlineError> {
        queries::leads::activity_since(self.db()?, since).await
    }

    async fn lead_records(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<LeadRecord>, RevlineError> {
        queries::leads::lead_records(self.db()?, since).await
    }
}
