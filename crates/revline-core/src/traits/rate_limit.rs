// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window request throttling keyed by caller.

use async_trait::async_trait;

use crate::error::RevlineError;
use crate::types::RateDecision;

/// Counts requests per key inside fixed time windows.
///
/// Implementations keep their counters in a store shared by every process
/// serving the same deployment.
#[async_trait]
pub trait RateLimiter: Send + Sync + 'static {
    /// Records one hit for `key` at `now_ms` and decides whether it is allowed.
    async fn hit(&self, key: &str, now_ms: i64) -> Result<RateDecision, RevlineError>;
}
