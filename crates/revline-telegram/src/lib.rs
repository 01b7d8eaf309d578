// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram integration for the Revline lead service.
//!
//! [`TelegramClient`] implements [`revline_core::ChatMessenger`] on top of
//! teloxide, [`TelegramNotifier`] routes lead cards to per-category chats,
//! and [`update`] turns webhook payloads into transport-neutral events.

pub mod client;
pub mod format;
pub mod notifier;
pub mod update;

pub use client::TelegramClient;
pub use notifier::{ChatRoutes, TelegramNotifier};
pub use update::{WebhookUpdate, parse_update};
