// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring the lead pipeline to a temporary database.
//!
//! `TestHarness` builds real SQLite storage in a temp directory, a recording
//! notification channel and a [`MockMessenger`], then assembles the pipeline
//! services on top so tests drive the same code paths production does.

use std::sync::Arc;

use revline_config::model::{RevlineConfig, StorageConfig};
use revline_core::types::{Operator, OperatorRole};
use revline_core::{ChatMessenger, NotificationChannel, RevlineError, StorageAdapter};
use revline_pipeline::{BotHandler, Fanout, JobRunner, LeadService, OperatorDirectory};
use revline_storage::{SqliteRateLimiter, SqliteStorage};

use crate::mock_channel::{FailingChannel, FailureMode, RecordingChannel};
use crate::mock_messenger::MockMessenger;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    failing: Option<FailureMode>,
    telegram: bool,
    config: RevlineConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            failing: None,
            telegram: true,
            config: RevlineConfig::default(),
        }
    }

    /// Adds a second channel that fails every delivery.
    pub fn with_failing_channel(mut self, mode: FailureMode) -> Self {
        self.failing = Some(mode);
        self
    }

    /// Builds the pipeline without a chat messenger, as when no bot token is set.
    pub fn without_telegram(mut self) -> Self {
        self.telegram = false;
        self
    }

    /// Starts from this config; the database path is always replaced.
    pub fn with_config(mut self, config: RevlineConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> Result<TestHarness, RevlineError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| RevlineError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("revline-test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };

        let sqlite = Arc::new(SqliteStorage::new(config.storage.clone()));
        sqlite.initialize().await?;
        let rate_limiter = sqlite.rate_limiter(&config.rate_limit)?;
        let storage: Arc<dyn StorageAdapter> = sqlite.clone();

        let recorder = Arc::new(RecordingChannel::new("recorder"));
        let mut channels: Vec<Arc<dyn NotificationChannel>> =
            vec![recorder.clone() as Arc<dyn NotificationChannel>];
        if let Some(mode) = self.failing {
            channels.insert(0, Arc::new(FailingChannel::new("failing", mode)));
        }

        let messenger = Arc::new(MockMessenger::new());
        let chat: Option<Arc<dyn ChatMessenger>> = self
            .telegram
            .then(|| messenger.clone() as Arc<dyn ChatMessenger>);

        let public_url = config.server.public_url.clone();
        let service = Arc::new(LeadService::new(
            storage.clone(),
            Fanout::new(channels),
            chat.clone(),
        ));
        let jobs = JobRunner::new(storage.clone(), chat.clone(), &public_url);
        let bot = chat.map(|chat| BotHandler::new(service.clone(), chat, &public_url));
        let operators = OperatorDirectory::new(storage.clone());

        Ok(TestHarness {
            config,
            sqlite,
            storage,
            rate_limiter,
            recorder,
            messenger,
            service,
            jobs,
            bot: bot.map(Arc::new),
            operators,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete pipeline over a throwaway database.
pub struct TestHarness {
    /// Config the harness was built from, pointing at the temp database.
    pub config: RevlineConfig,
    /// The concrete storage adapter.
    pub sqlite: Arc<SqliteStorage>,
    pub storage: Arc<dyn StorageAdapter>,
    /// Rate limiter sharing the temp database.
    pub rate_limiter: SqliteRateLimiter,
    /// Channel receiving every fanned-out lead.
    pub recorder: Arc<RecordingChannel>,
    /// Captures bot and operator messages.
    pub messenger: Arc<MockMessenger>,
    pub service: Arc<LeadService>,
    pub jobs: JobRunner,
    /// `None` when built without Telegram.
    pub bot: Option<Arc<BotHandler>>,
    pub operators: OperatorDirectory,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Default harness: recording channel plus mock Telegram.
    pub async fn new() -> Result<Self, RevlineError> {
        Self::builder().build().await
    }

    /// Registers an active operator.
    pub async fn add_operator(
        &self,
        telegram_id: i64,
        name: &str,
        role: OperatorRole,
    ) -> Result<(), RevlineError> {
        self.storage
            .upsert_operator(&Operator::new(telegram_id, name, role))
            .await
    }
}
