//! Repository invariants checked directly against the database.
//!
//! These tests require a `PostgreSQL` database with migrations applied,
//! named by `COUNTDOWN_TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p countdown-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use chrono::{Duration, SubsecRound, Utc};
use countdown_core::AdminAction;
use countdown_core::PageRequest;
use countdown_integration_tests::test_pool;
use sqlx::PgPool;
use tokio::task::JoinSet;
use countdown_server::db::admin_logs::{AdminLogRepository, MAX_ADMIN_LOGS};
use countdown_server::db::events::{EventFields, EventRepository};

async fn record(pool: &PgPool, description: String) {
    let mut tx = pool.begin().await.unwrap();
    AdminLogRepository::record_in(&mut tx, AdminAction::SettingsUpdated, &description)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

fn fields(title: &str) -> EventFields {
    EventFields {
        title: title.to_owned(),
        description: Some("Stored straight through the repository".to_owned()),
        // Postgres keeps microseconds
        event_date: (Utc::now() + Duration::days(30)).trunc_subsecs(0),
        event_type: "launch".to_owned(),
        background_image: None,
        mobile_background_image: None,
        is_public: false,
        allow_join: true,
    }
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_insert_get_delete() {
    let pool = test_pool().await;
    let repo = EventRepository::new(&pool);

    let created = repo.insert(None, &fields("Anonymous Launch")).await.unwrap();
    assert_eq!(created.version, 1);
    assert_eq!(created.user_id, None);

    let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    assert!(repo.delete(&created.id).await.unwrap());
    assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
    assert!(!repo.delete(&created.id).await.unwrap());

    let mut conn = pool.acquire().await.unwrap();
    assert!(!EventRepository::delete_in(&mut conn, &created.id).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_generated_ids_are_unique() {
    let pool = test_pool().await;
    let repo = EventRepository::new(&pool);

    let mut ids = HashSet::new();
    for i in 0..20 {
        let event = repo.insert(None, &fields(&format!("Batch {i}"))).await.unwrap();
        assert_eq!(event.id.as_str().len(), 8);
        assert!(ids.insert(event.id));
    }

    for id in &ids {
        repo.delete(id).await.unwrap();
    }
}

// One test so the newest-first check never races another writer.
#[tokio::test]
#[ignore = "Requires database"]
async fn test_admin_log_is_capped() {
    let pool = test_pool().await;
    let repo = AdminLogRepository::new(&pool);

    for i in 0..(MAX_ADMIN_LOGS + 20) {
        record(&pool, format!("Bulk entry {i}")).await;
    }

    let page = repo.list_paginated(PageRequest::new(Some(1))).await.unwrap();
    assert_eq!(page.total, u64::try_from(MAX_ADMIN_LOGS).unwrap());
    // Newest first
    assert_eq!(
        page.items[0].description,
        format!("Bulk entry {}", MAX_ADMIN_LOGS + 19)
    );

    let mut writers = JoinSet::new();
    for i in 0..50 {
        let pool = pool.clone();
        writers.spawn(async move { record(&pool, format!("Concurrent entry {i}")).await });
    }
    while let Some(joined) = writers.join_next().await {
        joined.unwrap();
    }

    let page = repo.list_paginated(PageRequest::new(Some(1))).await.unwrap();
    assert_eq!(page.total, u64::try_from(MAX_ADMIN_LOGS).unwrap());
}
