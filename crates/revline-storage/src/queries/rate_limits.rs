// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window counters in the `rate_limits` table.

use revline_core::RevlineError;
use revline_core::types::RateDecision;
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::debug;

use crate::database::{Database, map_tr_err};

/// Records a hit for `key` and decides whether it fits in the window.
///
/// A missing or expired window restarts at one hit. Otherwise the hit is
/// counted unless the window is already full; denied hits are not counted.
/// Restarting a window also drops every other window that has expired, so
/// the table only holds keys seen within the last window.
pub async fn hit(
    db: &Database,
    key: &str,
    now_ms: i64,
    window_ms: i64,
    max_requests: u32,
) -> Result<RateDecision, RevlineError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<RateDecision, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let current: Option<(i64, i64)> = tx
                .query_row(
                    "SELECT window_start, count FROM rate_limits WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let max = i64::from(max_requests);
            let decision = match current {
                Some((start, count)) if now_ms - start <= window_ms => {
                    let reset_after_ms = (start + window_ms - now_ms).max(0) as u64;
                    if count >= max {
                        RateDecision {
                            allowed: false,
                            remaining: 0,
                            reset_after_ms,
                        }
                    } else {
                        tx.execute(
                            "UPDATE rate_limits SET count = count + 1 WHERE key = ?1",
                            params![key],
                        )?;
                        RateDecision {
                            allowed: true,
                            remaining: (max - count - 1).max(0) as u32,
                            reset_after_ms,
                        }
                    }
                }
                _ => {
                    let purged = tx.execute(
                        "DELETE FROM rate_limits WHERE window_start < ?1",
                        params![now_ms - window_ms],
                    )?;
                    if purged > 0 {
                        debug!(purged, "expired rate limit windows removed");
                    }
                    tx.execute(
                        "INSERT INTO rate_limits (key, window_start, count) VALUES (?1, ?2, 1)
                         ON CONFLICT(key) DO UPDATE SET window_start = excluded.window_start, count = 1",
                        params![key, now_ms],
                    )?;
                    RateDecision {
                        allowed: true,
                        remaining: max_requests.saturating_sub(1),
                        reset_after_ms: window_ms.max(0) as u64,
                    }
                }
            };
            tx.commit()?;
            Ok(decision)
        })
        .await
        .map_err(map_tr_err)
}

/// Drops windows that ended before `now_ms`. Returns the number removed.
pub async fn purge_expired(db: &Database, now_ms: i64, window_ms: i64) -> Result<usize, RevlineError> {
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM rate_limits WHERE window_start < ?1",
                params![now_ms - window_ms],
            )
        })
        .await
        .map_err(map_tr_err)
}
