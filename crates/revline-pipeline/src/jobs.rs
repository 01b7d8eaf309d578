// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder and daily digest jobs, triggered over HTTP by an external scheduler.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use revline_core::{ChatMessenger, RevlineError, StorageAdapter};
use revline_telegram::format;
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::info;

use crate::operators::broadcast;

/// Which job a cron trigger runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CronTask {
    #[default]
    Reminders,
    Digest,
    All,
}

impl CronTask {
    /// `None` selects the default task; unknown names are rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, RevlineError> {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            None => Ok(Self::default()),
            Some(raw) => raw
                .parse()
                .map_err(|_| RevlineError::Validation(format!("Unknown task: {raw}"))),
        }
    }
}

/// What one job did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_to: Option<Vec<String>>,
}

impl JobOutcome {
    fn skipped(reason: &str) -> Self {
        Self {
            sent: false,
            reason: Some(reason.to_string()),
            sent_to: None,
        }
    }

    fn sent(names: Vec<String>) -> Self {
        if names.is_empty() {
            return Self::skipped("No operator could be reached");
        }
        Self {
            sent: true,
            reason: None,
            sent_to: Some(names),
        }
    }
}

/// Response body of a cron trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CronReport {
    Single(JobOutcome),
    All {
        reminders: JobOutcome,
        digest: JobOutcome,
    },
}

/// Runs the scheduled jobs against storage and the operator chat.
#[derive(Clone)]
pub struct JobRunner {
    storage: Arc<dyn StorageAdapter>,
    messenger: Option<Arc<dyn ChatMessenger>>,
    public_url: String,
}

impl JobRunner {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        messenger: Option<Arc<dyn ChatMessenger>>,
        public_url: &str,
    ) -> Self {
        Self {
            storage,
            messenger,
            public_url: public_url.to_string(),
        }
    }

    pub async fn run(&self, task: CronTask, now: DateTime<Utc>) -> Result<CronReport, RevlineError> {
        Ok(match task {
            CronTask::Reminders => CronReport::Single(self.reminders(now).await?),
            CronTask::Digest => CronReport::Single(self.digest(now).await?),
            CronTask::All => CronReport::All {
                reminders: self.reminders(now).await?,
                digest: self.digest(now).await?,
            },
        })
    }

    /// Nudges operators about leads that have waited too long.
    pub async fn reminders(&self, now: DateTime<Utc>) -> Result<JobOutcome, RevlineError> {
        let follow_up = self.storage.follow_up(now).await?;
        if follow_up.is_empty() {
            return Ok(JobOutcome::skipped("No reminders needed"));
        }
        let Some(messenger) = &self.messenger else {
            return Ok(JobOutcome::skipped("Telegram is not configured"));
        };

        let keyboard = format::reminder_keyboard(&follow_up, &self.public_url);
        let names = broadcast(
            self.storage.as_ref(),
            messenger.as_ref(),
            &format::reminder_text(&follow_up),
            Some(&keyboard),
            None,
        )
        .await?;
        info!(
            stale_new = follow_up.stale_new.len(),
            stale_in_progress = follow_up.stale_in_progress.len(),
            stale_partnerships = follow_up.stale_partnerships.len(),
            operators = names.len(),
            "reminders sent"
        );
        Ok(JobOutcome::sent(names))
    }

    /// Summarises the last 24 hours for operators.
    pub async fn digest(&self, now: DateTime<Utc>) -> Result<JobOutcome, RevlineError> {
        let summary = self.storage.activity_since(now - Duration::hours(24)).await?;
        if summary.leads == 0 && summary.replies == 0 {
            return Ok(JobOutcome::skipped("No activity today"));
        }
        let Some(messenger) = &self.messenger else {
            return Ok(JobOutcome::skipped("Telegram is not configured"));
        };

        let names = broadcast(
            self.storage.as_ref(),
            messenger.as_ref(),
            &format::digest_text(&summary),
            None,
            None,
        )
        .await?;
        info!(leads = summary.leads, replies = summary.replies, operators = names.len(), "digest sent");
        Ok(JobOutcome::sent(names))
    }
}
