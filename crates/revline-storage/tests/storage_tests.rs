// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite storage adapter.

use chrono::{Duration, TimeZone, Utc};
use revline_config::model::StorageConfig;
use revline_core::types::{
    LeadFilter, Metadata, NewLead, OperatorRole, Permission, ReplyChannel, format_timestamp,
};
use revline_core::{Lead, LeadCategory, LeadStatus, Operator, Reply, StorageAdapter};
use revline_storage::SqliteStorage;
use tempfile::TempDir;

async fn storage() -> (SqliteStorage, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("revline.db");
    let storage = SqliteStorage::new(StorageConfig {
        database_path: path.to_str().unwrap().to_string(),
        wal_mode: true,
    });
    storage.initialize().await.unwrap();
    (storage, dir)
}

fn lead(category: LeadCategory, body: &str) -> Lead {
    Lead::create(NewLead {
        name: "driver@example.com".to_string(),
        email: Some("driver@example.com".to_string()),
        phone: None,
        body: body.to_string(),
        category,
        metadata: Metadata::new(),
    })
}

fn lead_at(category: LeadCategory, status: LeadStatus, at: chrono::DateTime<Utc>) -> Lead {
    let mut lead = lead(category, "aged");
    lead.status = status;
    lead.created_at = format_timestamp(at);
    lead.updated_at = format_timestamp(at);
    lead
}

#[tokio::test]
async fn inserted_lead_is_fetchable_with_status_new() {
    let (storage, _dir) = storage().await;
    let mut new = lead(LeadCategory::Moto, "Exhaust for R1");
    new.metadata
        .insert("model".to_string(), serde_json::json!("Yamaha R1"));
    storage.insert_lead(&new).await.unwrap();

    let fetched = storage.get_lead(&new.id).await.unwrap().expect("lead exists");
    assert_eq!(fetched, new);
    assert_eq!(fetched.status, LeadStatus::New);
    assert_eq!(fetched.meta_str("model"), Some("Yamaha R1"));
}

#[tokio::test]
async fn unknown_lead_is_none() {
    let (storage, _dir) = storage().await;
    assert!(storage.get_lead("nope").await.unwrap().is_none());
    assert!(!storage.update_lead_status("nope", LeadStatus::Completed).await.unwrap());
    assert!(!storage.delete_lead("nope").await.unwrap());
}

#[tokio::test]
async fn list_filters_and_orders_newest_first() {
    let (storage, _dir) = storage().await;
    let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let oldest = lead_at(LeadCategory::Auto, LeadStatus::New, base);
    let middle = lead_at(LeadCategory::Moto, LeadStatus::New, base + Duration::minutes(1));
    let newest = lead_at(LeadCategory::Auto, LeadStatus::Replied, base + Duration::minutes(2));
    for l in [&oldest, &middle, &newest] {
        storage.insert_lead(l).await.unwrap();
    }

    let all = storage.list_leads(&LeadFilter::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec![newest.id.as_str(), middle.id.as_str(), oldest.id.as_str()]);

    let auto_new = storage
        .list_leads(&LeadFilter {
            status: Some(LeadStatus::New),
            category: Some(LeadCategory::Auto),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(auto_new.len(), 1);
    assert_eq!(auto_new[0].id, oldest.id);

    let page = storage
        .list_leads(&LeadFilter {
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, middle.id);
}

#[tokio::test]
async fn stats_count_status_and_category() {
    let (storage, _dir) = storage().await;
    storage.insert_lead(&lead(LeadCategory::Auto, "a")).await.unwrap();
    storage.insert_lead(&lead(LeadCategory::Moto, "b")).await.unwrap();
    let general = lead(LeadCategory::General, "c");
    storage.insert_lead(&general).await.unwrap();
    storage
        .update_lead_status(&general.id, LeadStatus::Archived)
        .await
        .unwrap();

    let stats = storage.lead_stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.new, 2);
    assert_eq!(stats.archived, 1);
    assert_eq!((stats.auto, stats.moto, stats.general), (1, 1, 1));
}

#[tokio::test]
async fn reply_marks_lead_replied_and_lists_newest_first() {
    let (storage, _dir) = storage().await;
    let new = lead(LeadCategory::Auto, "Need a tune");
    storage.insert_lead(&new).await.unwrap();

    let first = Reply::create(&new.id, "first", ReplyChannel::Email);
    let second = Reply::create(&new.id, "second", ReplyChannel::Telegram);
    assert!(storage.record_reply(&first).await.unwrap());
    assert!(storage.record_reply(&second).await.unwrap());

    let replies = storage.list_replies(&new.id).await.unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].content, "second");
    assert_eq!(replies[0].sent_via, ReplyChannel::Telegram);

    let updated = storage.get_lead(&new.id).await.unwrap().unwrap();
    assert_eq!(updated.status, LeadStatus::Replied);
}

#[tokio::test]
async fn reply_to_unknown_lead_writes_nothing() {
    let (storage, _dir) = storage().await;
    let orphan = Reply::create("missing", "hello", ReplyChannel::Email);
    assert!(!storage.record_reply(&orphan).await.unwrap());
    assert!(storage.list_replies("missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_cascades_to_replies() {
    let (storage, _dir) = storage().await;
    let new = lead(LeadCategory::Auto, "delete me");
    storage.insert_lead(&new).await.unwrap();
    storage
        .record_reply(&Reply::create(&new.id, "bye", ReplyChannel::Email))
        .await
        .unwrap();

    assert!(storage.delete_lead(&new.id).await.unwrap());
    assert!(storage.get_lead(&new.id).await.unwrap().is_none());
    assert!(storage.list_replies(&new.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn operator_permissions_follow_role_on_every_upsert() {
    let (storage, _dir) = storage().await;
    storage
        .upsert_operator(&Operator::new(42, "Olena", OperatorRole::Superadmin))
        .await
        .unwrap();
    let op = storage.get_operator(42).await.unwrap().unwrap();
    assert_eq!(op.permissions.len(), 4);

    // Stale permissions on the input are ignored.
    let mut demoted = Operator::new(42, "Olena", OperatorRole::Admin);
    demoted.permissions = vec![Permission::Settings];
    storage.upsert_operator(&demoted).await.unwrap();

    let op = storage.get_operator(42).await.unwrap().unwrap();
    assert_eq!(op.role, OperatorRole::Admin);
    assert_eq!(op.permissions, vec![Permission::Messages]);
}

#[tokio::test]
async fn deactivated_operators_are_hidden_and_upsert_reactivates() {
    let (storage, _dir) = storage().await;
    storage
        .upsert_operator(&Operator::new(1, "A", OperatorRole::Admin))
        .await
        .unwrap();
    storage
        .upsert_operator(&Operator::new(2, "B", OperatorRole::Admin))
        .await
        .unwrap();

    assert!(storage.deactivate_operator(1).await.unwrap());
    assert!(!storage.deactivate_operator(1).await.unwrap());
    assert!(!storage.deactivate_operator(99).await.unwrap());
    let active = storage.list_active_operators().await.unwrap();
    assert_eq!(active.iter().map(|o| o.telegram_id).collect::<Vec<_>>(), vec![2]);
    assert!(!storage.get_operator(1).await.unwrap().unwrap().is_active);

    storage
        .upsert_operator(&Operator::new(1, "A", OperatorRole::Admin))
        .await
        .unwrap();
    assert_eq!(storage.list_active_operators().await.unwrap().len(), 2);
}

#[tokio::test]
async fn follow_up_selects_stale_leads() {
    let (storage, _dir) = storage().await;
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap();

    let fresh = lead_at(LeadCategory::Auto, LeadStatus::New, now - Duration::minutes(30));
    let stale = lead_at(LeadCategory::Auto, LeadStatus::New, now - Duration::hours(2));
    let answered = lead_at(LeadCategory::Moto, LeadStatus::New, now - Duration::hours(2));
    let idle = lead_at(LeadCategory::Auto, LeadStatus::InProgress, now - Duration::hours(30));
    let mut partner = lead_at(LeadCategory::General, LeadStatus::New, now - Duration::days(4));
    partner
        .metadata
        .insert("kind".to_string(), serde_json::json!("partnership"));
    for l in [&fresh, &stale, &answered, &idle, &partner] {
        storage.insert_lead(l).await.unwrap();
    }
    // Reset to NEW after a reply; the existing reply still excludes it.
    storage
        .record_reply(&Reply::create(&answered.id, "on it", ReplyChannel::Email))
        .await
        .unwrap();
    storage
        .update_lead_status(&answered.id, LeadStatus::New)
        .await
        .unwrap();

    let follow = storage.follow_up(now).await.unwrap();
    let stale_ids: Vec<_> = follow.stale_new.iter().map(|l| l.id.clone()).collect();
    assert!(stale_ids.contains(&stale.id));
    assert!(stale_ids.contains(&partner.id));
    assert!(!stale_ids.contains(&fresh.id));
    assert!(!stale_ids.contains(&answered.id));
    assert_eq!(follow.stale_in_progress.len(), 1);
    assert_eq!(follow.stale_in_progress[0].id, idle.id);
    assert_eq!(follow.stale_partnerships.len(), 1);
    assert_eq!(follow.stale_partnerships[0].id, partner.id);
}

#[tokio::test]
async fn activity_counts_window_only() {
    let (storage, _dir) = storage().await;
    let now = Utc::now();
    let old = lead_at(LeadCategory::Auto, LeadStatus::New, now - Duration::days(2));
    storage.insert_lead(&old).await.unwrap();

    let auto = lead(LeadCategory::Auto, "x");
    let moto = lead(LeadCategory::Moto, "y");
    let mut partner = lead(LeadCategory::General, "z");
    partner
        .metadata
        .insert("kind".to_string(), serde_json::json!("partnership"));
    for l in [&auto, &moto, &partner] {
        storage.insert_lead(l).await.unwrap();
    }
    storage
        .record_reply(&Reply::create(&moto.id, "hi", ReplyChannel::Email))
        .await
        .unwrap();

    let summary = storage
        .activity_since(now - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(summary.leads, 3);
    assert_eq!((summary.auto, summary.moto, summary.general), (1, 1, 1));
    assert_eq!(summary.partnerships, 1);
    assert_eq!(summary.replies, 1);
    assert_eq!(summary.open_new, 2);
}

#[tokio::test]
async fn lead_records_carry_kind_and_first_reply() {
    let (storage, _dir) = storage().await;
    let now = Utc::now();
    let old = lead_at(LeadCategory::Moto, LeadStatus::Archived, now - Duration::days(40));
    storage.insert_lead(&old).await.unwrap();

    let mut partner = lead_at(LeadCategory::General, LeadStatus::New, now - Duration::hours(5));
    partner
        .metadata
        .insert("kind".to_string(), serde_json::json!("partnership"));
    storage.insert_lead(&partner).await.unwrap();

    let mut early = Reply::create(&partner.id, "first", ReplyChannel::Email);
    early.created_at = format_timestamp(now - Duration::hours(4));
    let mut late = Reply::create(&partner.id, "second", ReplyChannel::Email);
    late.created_at = format_timestamp(now - Duration::hours(1));
    storage.record_reply(&late).await.unwrap();
    storage.record_reply(&early).await.unwrap();

    let recent = storage
        .lead_records(Some(now - Duration::days(7)))
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].kind.as_deref(), Some("partnership"));
    assert_eq!(recent[0].status, LeadStatus::Replied);
    assert_eq!(recent[0].first_reply_at, Some(early.created_at.clone()));

    let all = storage.lead_records(None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].category, LeadCategory::Moto);
    assert_eq!(all[0].kind, None);
    assert_eq!(all[0].first_reply_at, None);
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("persist.db");
    let config = StorageConfig {
        database_path: path.to_str().unwrap().to_string(),
        wal_mode: true,
    };
    let new = lead(LeadCategory::Auto, "persist");
    {
        let storage = SqliteStorage::new(config.clone());
        storage.initialize().await.unwrap();
        storage.insert_lead(&new).await.unwrap();
        storage.close().await.unwrap();
    }
    let storage = SqliteStorage::new(config);
    storage.initialize().await.unwrap();
    assert!(storage.get_lead(&new.id).await.unwrap().is_some());
}
