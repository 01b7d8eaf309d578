// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator upsert and lookup.

use revline_core::RevlineError;
use revline_core::types::{Operator, OperatorRole, now_timestamp};
use rusqlite::{OptionalExtension, params};

use super::conversion_err;
use crate::database::{Database, map_tr_err};

const OPERATOR_COLUMNS: &str =
    "telegram_id, name, role, permissions, is_active, created_at, updated_at";

fn operator_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Operator> {
    let role: String = row.get(2)?;
    let permissions: String = row.get(3)?;
    Ok(Operator {
        telegram_id: row.get(0)?,
        name: row.get(1)?,
        role: role.parse().map_err(|e| conversion_err(2, e))?,
        permissions: serde_json::from_str(&permissions).map_err(|e| conversion_err(3, e))?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Inserts or updates an operator by Telegram id.
///
/// Permissions are always recomputed from the role, and the operator is
/// reactivated. `created_at` survives updates.
pub async fn upsert_operator(db: &Database, operator: &Operator) -> Result<(), RevlineError> {
    let telegram_id = operator.telegram_id;
    let name = operator.name.clone();
    let role: OperatorRole = operator.role;
    let permissions =
        serde_json::to_string(&role.permissions()).map_err(|e| RevlineError::Storage {
            source: Box::new(e),
        })?;
    let created_at = operator.created_at.clone();
    let now = now_timestamp();

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO operators (telegram_id, name, role, permissions, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)
                 ON CONFLICT(telegram_id) DO UPDATE SET
                    name = excluded.name,
                    role = excluded.role,
                    permissions = excluded.permissions,
                    is_active = 1,
                    updated_at = excluded.updated_at",
                params![telegram_id, name, role.to_string(), permissions, created_at, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetches an operator regardless of whether it is active.
pub async fn get_operator(db: &Database, telegram_id: i64) -> Result<Option<Operator>, RevlineError> {
    db.connection()
        .call(move |conn| -> Result<Option<Operator>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {OPERATOR_COLUMNS} FROM operators WHERE telegram_id = ?1"),
                params![telegram_id],
                operator_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Active operators, oldest first.
pub async fn list_active_operators(db: &Database) -> Result<Vec<Operator>, RevlineError> {
    db.connection()
        .call(|conn| -> Result<Vec<Operator>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OPERATOR_COLUMNS} FROM operators
                 WHERE is_active = 1 ORDER BY created_at ASC, telegram_id ASC"
            ))?;
            let rows = stmt.query_map([], operator_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Marks an operator inactive. Returns `false` for unknown or already inactive ids.
pub async fn deactivate_operator(db: &Database, telegram_id: i64) -> Result<bool, RevlineError> {
    let now = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE operators SET is_active = 0, updated_at = ?1
                 WHERE telegram_id = ?2 AND is_active = 1",
                params![now, telegram_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
