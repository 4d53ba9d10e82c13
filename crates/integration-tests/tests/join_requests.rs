//! Integration tests for join requests, the owner dashboard and CSV export.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p countdown-server)
//!
//! Run with: cargo test -p countdown-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use countdown_integration_tests::{client, create_event, event_body, unique_email, url, user_client};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

async fn join(event_id: &str, name: &str) -> reqwest::Response {
    client()
        .post(url(&format!("/api/events/{event_id}/join")))
        .json(&json!({ "name": name, "email": unique_email("guest"), "message": "Count me in" }))
        .send()
        .await
        .unwrap()
}

async fn dashboard_requests(client: &Client, event_id: &str) -> Value {
    client
        .get(url(&format!("/api/dashboard/join-requests?event_id={event_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_join_and_export() {
    let (owner, _) = user_client("host").await;
    let event = create_event(&owner, &event_body("Garden Party", 14)).await;
    let id = event["id"].as_str().unwrap();

    for name in ["Ana", "Ben", "Chloe \"CJ\" Jones"] {
        assert_eq!(join(id, name).await.status(), StatusCode::CREATED);
    }

    let list = dashboard_requests(&owner, id).await;
    let requests = list["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r["event_title"] == "Garden Party"));
    assert!(list["unread"].as_i64().unwrap() >= 3);

    let resp = owner
        .get(url(&format!("/api/dashboard/join-requests/export?event_id={id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("join-requests-")
    );
    let csv = resp.text().await.unwrap();
    let lines: Vec<&str> = csv.split('\n').collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Event Title,Name,Email,Phone,Message,Joined Date");
    assert!(csv.contains("\"Chloe \"\"CJ\"\" Jones\""));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_read_unread_reply_and_delete() {
    let (owner, _) = user_client("inbox").await;
    let event = create_event(&owner, &event_body("Book Launch", 7)).await;
    let id = event["id"].as_str().unwrap();
    let joined: Value = join(id, "Reader").await.json().await.unwrap();
    let request_id = joined["id"].as_i64().unwrap();
    assert_eq!(joined["is_read"], false);

    let resp: Value = owner
        .post(url(&format!("/api/dashboard/join-requests/{request_id}/read")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["is_read"], true);

    let resp: Value = owner
        .post(url(&format!("/api/dashboard/join-requests/{request_id}/unread")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["is_read"], false);

    let link: Value = owner
        .get(url(&format!("/api/dashboard/join-requests/{request_id}/reply-link")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(link["mailto"].as_str().unwrap().starts_with("mailto:"));
    let list = dashboard_requests(&owner, id).await;
    assert_eq!(list["requests"][0]["is_read"], true);

    // Someone else cannot touch it
    let (stranger, _) = user_client("stranger").await;
    let resp = stranger
        .delete(url(&format!("/api/dashboard/join-requests/{request_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = owner
        .delete(url(&format!("/api/dashboard/join-requests/{request_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let list = dashboard_requests(&owner, id).await;
    assert!(list["requests"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_join_closed_event() {
    let (owner, _) = user_client("closed").await;
    let mut body = event_body("Invite Only", 3);
    body["allow_join"] = Value::Bool(false);
    let event = create_event(&owner, &body).await;

    let resp = join(event["id"].as_str().unwrap(), "Crasher").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_join_requires_valid_email() {
    let (owner, _) = user_client("validate").await;
    let event = create_event(&owner, &event_body("Picnic", 3)).await;
    let id = event["id"].as_str().unwrap();

    let resp = client()
        .post(url(&format!("/api/events/{id}/join")))
        .json(&json!({ "name": "Nobody", "email": "not-an-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
