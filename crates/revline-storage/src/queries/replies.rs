// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply persistence.

use revline_core::RevlineError;
use revline_core::types::{LeadStatus, Reply};
use rusqlite::params;

use super::conversion_err;
use crate::database::{Database, map_tr_err};

/// Stores `reply` and marks its lead REPLIED in one transaction.
///
/// Returns `false`, writing nothing, when the lead does not exist.
pub async fn record_reply(db: &Database, reply: &Reply) -> Result<bool, RevlineError> {
    let reply = reply.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM leads WHERE id = ?1)",
                params![reply.lead_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Ok(false);
            }

            tx.execute(
                "INSERT INTO replies (id, lead_id, content, sent_via, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    reply.id,
                    reply.lead_id,
                    reply.content,
                    reply.sent_via.to_string(),
                    reply.created_at,
                ],
            )?;
            tx.execute(
                "UPDATE leads SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![
                    LeadStatus::Replied.to_string(),
                    reply.created_at,
                    reply.lead_id
                ],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Replies to a lead, newest first.
pub async fn list_replies(db: &Database, lead_id: &str) -> Result<Vec<Reply>, RevlineError> {
    let lead_id = lead_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Reply>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, lead_id, content, sent_via, created_at FROM replies
                 WHERE lead_id = ?1 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map(params![lead_id], |row| {
                let sent_via: String = row.get(3)?;
                Ok(Reply {
                    id: row.get(0)?,
                    lead_id: row.get(1)?,
                    content: row.get(2)?,
                    sent_via: sent_via.parse().map_err(|e| conversion_err(3, e))?,
                    created_at: row.get(4)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
