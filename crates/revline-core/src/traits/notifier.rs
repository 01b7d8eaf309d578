// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound lead notification channels (Telegram chats, email).

use async_trait::async_trait;

use crate::error::RevlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Lead;

/// A best-effort destination for freshly persisted leads.
///
/// Each channel picks its own per-category destination and formats the lead
/// itself. A missing destination is reported as [`RevlineError::Config`];
/// callers log it and carry on.
#[async_trait]
pub trait NotificationChannel: PluginAdapter {
    /// Delivers one lead notification. Attempted once, never retried.
    async fn deliver(&self, lead: &Lead) -> Result<(), RevlineError>;
}
