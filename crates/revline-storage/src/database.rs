// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management.
//!
//! Every query runs on tokio-rusqlite's single background thread, which
//! serializes writes. Migrations run once on a short-lived blocking
//! connection before that thread is started.

use std::path::Path;

use revline_core::RevlineError;
use tracing::debug;

use crate::migrations;

const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Handle to the migrated SQLite database. Clones share the same connection thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and applies migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, RevlineError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RevlineError::Storage {
                source: Box::new(e),
            })?;
        }

        let owned = path.to_string();
        let applied = tokio::task::spawn_blocking(move || -> Result<usize, RevlineError> {
            let mut conn = rusqlite::Connection::open(&owned).map_err(|e| RevlineError::Storage {
                source: Box::new(e),
            })?;
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode=WAL;")
                    .map_err(|e| RevlineError::Storage {
                        source: Box::new(e),
                    })?;
            }
            migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| RevlineError::Internal(format!("migration task failed: {e}")))??;
        debug!(path, applied, "migrations applied");

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| RevlineError::Storage {
                source: Box::new(e),
            })?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA foreign_keys=ON;")?;
            conn.busy_timeout(std::time::Duration::from_millis(u64::from(BUSY_TIMEOUT_MS)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        Ok(Self { conn })
    }

    /// The background connection all queries go through.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Truncating WAL checkpoint, run before shutdown.
    pub async fn checkpoint(&self) -> Result<(), RevlineError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Converts a tokio-rusqlite error into [`RevlineError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> RevlineError {
    RevlineError::Storage {
        source: Box::new(e),
    }
}
