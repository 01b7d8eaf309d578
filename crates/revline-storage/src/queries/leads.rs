// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead CRUD, inbox counters and follow-up queries.

use chrono::{DateTime, Duration, Utc};
use revline_core::RevlineError;
use revline_core::analytics::LeadRecord;
use revline_core::types::{
    ActivitySummary, FollowUp, Lead, LeadCategory, LeadFilter, LeadStats, LeadStatus,
    format_timestamp, now_timestamp,
};
use rusqlite::{OptionalExtension, params, params_from_iter};

use super::conversion_err;
use crate::database::{Database, map_tr_err};

/// Page size used when the caller gives none.
pub const DEFAULT_LIMIT: u32 = 50;

/// Largest page a caller may request.
pub const MAX_LIMIT: u32 = 200;

const LEAD_COLUMNS: &str =
    "id, name, email, phone, body, category, status, metadata, created_at, updated_at";

pub(crate) fn lead_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    let category: String = row.get(5)?;
    let status: String = row.get(6)?;
    let metadata: String = row.get(7)?;
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        body: row.get(4)?,
        category: category.parse().map_err(|e| conversion_err(5, e))?,
        status: status.parse().map_err(|e| conversion_err(6, e))?,
        metadata: serde_json::from_str(&metadata).map_err(|e| conversion_err(7, e))?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Inserts a new lead.
pub async fn insert_lead(db: &Database, lead: &Lead) -> Result<(), RevlineError> {
    let lead = lead.clone();
    let metadata = serde_json::to_string(&lead.metadata).map_err(|e| RevlineError::Storage {
        source: Box::new(e),
    })?;
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO leads (id, name, email, phone, body, category, status, metadata, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    lead.id,
                    lead.name,
                    lead.email,
                    lead.phone,
                    lead.body,
                    lead.category.to_string(),
                    lead.status.to_string(),
                    metadata,
                    lead.created_at,
                    lead.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetches one lead by id.
pub async fn get_lead(db: &Database, id: &str) -> Result<Option<Lead>, RevlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Lead>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
                params![id],
                lead_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Lists leads newest first, filtered by status and category.
pub async fn list_leads(db: &Database, filter: &LeadFilter) -> Result<Vec<Lead>, RevlineError> {
    let mut clauses = Vec::new();
    let mut values: Vec<rusqlite::types::Value> = Vec::new();
    if let Some(status) = filter.status {
        values.push(status.to_string().into());
        clauses.push(format!("status = ?{}", values.len()));
    }
    if let Some(category) = filter.category {
        values.push(category.to_string().into());
        clauses.push(format!("category = ?{}", values.len()));
    }
    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = filter.offset.unwrap_or(0);
    let sql = format!(
        "SELECT {LEAD_COLUMNS} FROM leads {where_sql}
         ORDER BY created_at DESC, rowid DESC LIMIT {limit} OFFSET {offset}"
    );

    db.connection()
        .call(move |conn| -> Result<Vec<Lead>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), lead_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Counts leads per status and per category.
pub async fn lead_stats(db: &Database) -> Result<LeadStats, RevlineError> {
    db.connection()
        .call(|conn| -> Result<LeadStats, rusqlite::Error> {
            let mut stats = LeadStats::default();
            let mut stmt = conn.prepare("SELECT status, category, COUNT(*) FROM leads GROUP BY status, category")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let status: String = row.get(0)?;
                let category: String = row.get(1)?;
                let count: i64 = row.get(2)?;
                let count = count.max(0) as u64;

                stats.total += count;
                match status.parse::<LeadStatus>().map_err(|e| conversion_err(0, e))? {
                    LeadStatus::New => stats.new += count,
                    LeadStatus::InProgress => stats.in_progress += count,
                    LeadStatus::Replied => stats.replied += count,
                    LeadStatus::Completed => stats.completed += count,
                    LeadStatus::Archived => stats.archived += count,
                }
                match category.parse::<LeadCategory>().map_err(|e| conversion_err(1, e))? {
                    LeadCategory::Auto => stats.auto += count,
                    LeadCategory::Moto => stats.moto += count,
                    LeadCategory::General => stats.general += count,
                }
            }
            Ok(stats)
        })
        .await
        .map_err(map_tr_err)
}

/// Sets a lead's status and bumps `updated_at`. Returns `false` for unknown ids.
pub async fn update_lead_status(
    db: &Database,
    id: &str,
    status: LeadStatus,
) -> Result<bool, RevlineError> {
    let id = id.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE leads SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.to_string(), now, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Deletes a lead; its replies go with it through the foreign key cascade.
pub async fn delete_lead(db: &Database, id: &str) -> Result<bool, RevlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute("DELETE FROM leads WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Leads waiting on an operator as of `now`.
pub async fn follow_up(db: &Database, now: DateTime<Utc>) -> Result<FollowUp, RevlineError> {
    let hour_ago = format_timestamp(now - Duration::hours(1));
    let day_ago = format_timestamp(now - Duration::hours(24));
    let three_days_ago = format_timestamp(now - Duration::days(3));

    db.connection()
        .call(move |conn| -> Result<FollowUp, rusqlite::Error> {
            let select = |sql: &str, cutoff: &str| -> Result<Vec<Lead>, rusqlite::Error> {
                let mut stmt = conn.prepare(sql)?;
                let rows = stmt.query_map(params![cutoff], lead_from_row)?;
                rows.collect()
            };

            Ok(FollowUp {
                stale_new: select(
                    &format!(
                        "SELECT {LEAD_COLUMNS} FROM leads l
                         WHERE status = 'NEW' AND created_at < ?1
                           AND NOT EXISTS (SELECT 1 FROM replies r WHERE r.lead_id = l.id)
                         ORDER BY created_at ASC"
                    ),
                    &hour_ago,
                )?,
                stale_in_progress: select(
                    &format!(
                        "SELECT {LEAD_COLUMNS} FROM leads
                         WHERE status = 'IN_PROGRESS' AND updated_at < ?1
                         ORDER BY updated_at ASC"
                    ),
                    &day_ago,
                )?,
                stale_partnerships: select(
                    &format!(
                        "SELECT {LEAD_COLUMNS} FROM leads
                         WHERE status = 'NEW' AND created_at < ?1
                           AND json_extract(metadata, '$.kind') = 'partnership'
                         ORDER BY created_at ASC"
                    ),
                    &three_days_ago,
                )?,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Counts leads and replies created since `since`.
pub async fn activity_since(
    db: &Database,
    since: DateTime<Utc>,
) -> Result<ActivitySummary, RevlineError> {
    let since = format_timestamp(since);
    db.connection()
        .call(move |conn| -> Result<ActivitySummary, rusqlite::Error> {
            let (leads, auto, moto, general, partnerships, open_new) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(category = 'AUTO'), 0),
                        COALESCE(SUM(category = 'MOTO'), 0),
                        COALESCE(SUM(category = 'GENERAL'), 0),
                        COALESCE(SUM(json_extract(metadata, '$.kind') = 'partnership'), 0),
                        COALESCE(SUM(status = 'NEW'), 0)
                 FROM leads WHERE created_at >= ?1",
                params![since],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )?;
            let replies: i64 = conn.query_row(
                "SELECT COUNT(*) FROM replies WHERE created_at >= ?1",
                params![since],
                |row| row.get(0),
            )?;

            let count = |n: i64| n.max(0) as u64;
            Ok(ActivitySummary {
                leads: count(leads),
                auto: count(auto),
                moto: count(moto),
                general: count(general),
                partnerships: count(partnerships),
                replies: count(replies),
                open_new: count(open_new),
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Analytics rows for leads created at or after `since`, oldest first.
pub async fn lead_records(
    db: &Database,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<LeadRecord>, RevlineError> {
    let since = since.map(format_timestamp);
    db.connection()
        .call(move |conn| -> Result<Vec<LeadRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT l.category, l.status, json_extract(l.metadata, '$.kind'), l.created_at,
                        (SELECT MIN(r.created_at) FROM replies r WHERE r.lead_id = l.id)
                 FROM leads l
                 WHERE ?1 IS NULL OR l.created_at >= ?1
                 ORDER BY l.created_at ASC",
            )?;
            let rows = stmt.query_map(params![since], |row| {
                let category: String = row.get(0)?;
                let status: String = row.get(1)?;
                Ok(LeadRecord {
                    category: category.parse().map_err(|e| conversion_err(0, e))?,
                    status: status.parse().map_err(|e| conversion_err(1, e))?,
                    kind: row.get(2)?,
                    created_at: row.get(3)?,
                    first_reply_at: row.get(4)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
