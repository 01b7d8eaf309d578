// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod messenger;
pub mod notifier;
pub mod rate_limit;
pub mod storage;

pub use adapter::PluginAdapter;
pub use messenger::ChatMessenger;
pub use notifier::NotificationChannel;
pub use rate_limit::RateLimiter;
pub use storage::StorageAdapter;
