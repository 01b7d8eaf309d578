// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Revline lead service.
//!
//! WAL-mode SQLite with embedded refinery migrations, all access serialized
//! through tokio-rusqlite's background thread. Also hosts the rate-limit
//! store, so throttling is shared by every process using the database.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;
pub mod rate_limit;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use rate_limit::SqliteRateLimiter;
