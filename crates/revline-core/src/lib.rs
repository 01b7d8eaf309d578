// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Revline lead service.
//!
//! This crate provides the error type, the lead/reply/operator domain
//! types, the adapter traits implemented by storage and notification
//! backends, the pure locale resolver and lead analytics aggregates.

pub mod analytics;
pub mod error;
pub mod html;
pub mod locale;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RevlineError;
pub use locale::{Locale, LocaleSignals, resolve_locale};
pub use types::{AdapterType, HealthStatus, Lead, LeadCategory, LeadStatus, Operator, Reply};

// Re-export all adapter traits at crate root.
pub use traits::{
    ChatMessenger, NotificationChannel, PluginAdapter, RateLimiter, StorageAdapter,
};
