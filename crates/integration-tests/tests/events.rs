//! Integration tests for event CRUD, concurrency and countdowns.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p countdown-server)
//!
//! Run with: cargo test -p countdown-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use countdown_integration_tests::{client, create_event, event_body, url, user_client};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_create_then_get_returns_same_event() {
    let (client, _) = user_client("events").await;
    let created = create_event(&client, &event_body("Round Trip", 30)).await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(id.len(), 8);
    assert_eq!(created["version"], 1);

    let fetched: Value = client
        .get(url(&format!("/api/events/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_update_requires_current_version() {
    let (client, _) = user_client("versions").await;
    let created = create_event(&client, &event_body("Versioned", 30)).await;
    let id = created["id"].as_str().unwrap();

    let mut body = event_body("Versioned (renamed)", 30);
    body["event_date"] = created["event_date"].clone();

    // Missing version
    let resp = client
        .put(url(&format!("/api/events/{id}")))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    body["version"] = created["version"].clone();
    let resp = client
        .put(url(&format!("/api/events/{id}")))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["title"], "Versioned (renamed)");

    // Same stale version again
    let resp = client
        .put(url(&format!("/api/events/{id}")))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_only_owner_can_modify() {
    let (owner, _) = user_client("owner").await;
    let (other, _) = user_client("other").await;
    let created = create_event(&owner, &event_body("Mine", 10)).await;
    let id = created["id"].as_str().unwrap();

    let resp = other
        .delete(url(&format!("/api/events/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client()
        .delete(url(&format!("/api/events/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_delete_then_get_is_not_found() {
    let (client, _) = user_client("delete").await;
    let created = create_event(&client, &event_body("Short Lived", 5)).await;
    let id = created["id"].as_str().unwrap();

    let resp = client
        .delete(url(&format!("/api/events/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(url(&format!("/api/events/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_past_date_is_rejected() {
    let (client, _) = user_client("past").await;
    let resp = client
        .post(url("/api/events"))
        .json(&event_body("Yesterday", -1))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_countdown_share_and_page() {
    let (client, _) = user_client("countdown").await;
    let mut body = event_body("Private Launch", 2);
    body["is_public"] = Value::Bool(false);
    let created = create_event(&client, &body).await;
    let id = created["id"].as_str().unwrap();

    let snapshot: Value = client
        .get(url(&format!("/api/events/{id}/countdown")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot["expired"], false);
    assert!(snapshot["days"].as_u64().unwrap() <= 2);

    let share: Value = client
        .get(url(&format!("/api/events/{id}/share")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(share["url"].as_str().unwrap().ends_with(&format!("/event/{id}")));
    assert!(share["email"].as_str().unwrap().starts_with("mailto:"));

    // Private events stay off the gallery but are reachable by link
    let public: Vec<Value> = client
        .get(url("/api/events"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(public.iter().all(|e| e["id"] != created["id"]));

    let resp = client
        .get(url(&format!("/event/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Private Launch"));
    assert!(html.contains("og:title"));
}
