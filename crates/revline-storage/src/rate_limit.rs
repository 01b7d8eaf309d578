// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`RateLimiter`] backed by the shared SQLite database.

use async_trait::async_trait;
use revline_config::model::RateLimitConfig;
use revline_core::types::RateDecision;
use revline_core::{RateLimiter, RevlineError};
use tracing::debug;

use crate::database::Database;
use crate::queries;

/// Fixed-window limiter whose counters live in the `rate_limits` table.
///
/// Every process opening the same database file sees the same windows.
#[derive(Clone)]
pub struct SqliteRateLimiter {
    db: Database,
    window_ms: i64,
    max_requests: u32,
}

impl SqliteRateLimiter {
    pub fn new(db: Database, config: &RateLimitConfig) -> Self {
        Self {
            db,
            window_ms: i64::try_from(config.window_secs.saturating_mul(1000)).unwrap_or(i64::MAX),
            max_requests: config.max_requests,
        }
    }

    /// Removes windows that can no longer affect a decision.
    pub async fn purge_expired(&self, now_ms: i64) -> Result<usize, RevlineError> {
        queries::rate_limits::purge_expired(&self.db, now_ms, self.window_ms).await
    }
}

#[async_trait]
impl RateLimiter for SqliteRateLimiter {
    async fn hit(&self, key: &str, now_ms: i64) -> Result<RateDecision, RevlineError> {
        let decision =
            queries::rate_limits::hit(&self.db, key, now_ms, self.window_ms, self.max_requests)
                .await?;
        if !decision.allowed {
            debug!(key, reset_after_ms = decision.reset_after_ms, "rate limit exceeded");
        }
        Ok(decision)
    }
}
