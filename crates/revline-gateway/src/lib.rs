// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Revline lead service.
//!
//! Exposes form intake, the admin inbox API, the Telegram webhook, operator
//! management, analytics reports, scheduled job triggers and locale routing over axum.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod locale;
pub mod rate_limit;
pub mod server;
pub mod session;
pub mod telegram;

pub use auth::{AuthConfig, SESSION_COOKIE};
pub use error::{ApiError, ApiResult};
pub use locale::LocalePolicy;
pub use server::{AppState, router, serve};
pub use session::SessionSigner;
