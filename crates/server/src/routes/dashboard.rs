//! Dashboard route handlers: a user's own events and the join requests
//! they have received.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use countdown_core::JoinRequestId;
use countdown_core::csv::{export_filename, join_requests_csv};
use countdown_core::links::mailto;

use super::events::parse_event_id;
use crate::db::stats::{DashboardStats, dashboard_stats};
use crate::db::{EventRepository, JoinRequestRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{EventWithCountdown, JoinRequest};
use crate::state::AppState;

/// Optional event filter for join request listings.
#[derive(Debug, Default, Deserialize)]
pub struct JoinRequestQuery {
    pub event_id: Option<String>,
}

/// Join requests with the owner's unread count.
#[derive(Debug, Serialize)]
pub struct JoinRequestList {
    pub requests: Vec<JoinRequest>,
    pub unread: i64,
}

/// A `mailto:` link for answering a join request.
#[derive(Debug, Serialize)]
pub struct ReplyLink {
    pub mailto: String,
}

fn request_not_found(_: crate::db::RepositoryError) -> AppError {
    AppError::NotFound("Join request not found".to_owned())
}

/// The current user's events, newest first, each with its countdown.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn events(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<EventWithCountdown>>> {
    let now = Utc::now();
    let events = EventRepository::new(state.pool())
        .list_for_user(user.id)
        .await?
        .into_iter()
        .map(|event| EventWithCountdown {
            countdown: event.snapshot(now),
            event,
        })
        .collect();
    Ok(Json(events))
}

/// Statistics over the current user's events.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn stats(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<DashboardStats>> {
    Ok(Json(dashboard_stats(state.pool(), user.id, Utc::now()).await?))
}

/// Join requests for the current user's events.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn join_requests(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<JoinRequestQuery>,
) -> Result<Json<JoinRequestList>> {
    let event_id = query.event_id.as_deref().map(parse_event_id).transpose()?;
    let repo = JoinRequestRepository::new(state.pool());

    let requests = repo.list_for_owner(user.id, event_id.as_ref()).await?;
    let unread = repo.unread_count_for_owner(user.id).await?;
    Ok(Json(JoinRequestList { requests, unread }))
}

/// Download the current user's join requests as CSV.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn export(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<JoinRequestQuery>,
) -> Result<impl IntoResponse> {
    let event_id = query.event_id.as_deref().map(parse_event_id).transpose()?;
    let requests = JoinRequestRepository::new(state.pool())
        .list_for_owner(user.id, event_id.as_ref())
        .await?;

    info!(count = requests.len(), "Exporting join requests");
    Ok(csv_attachment(&requests))
}

/// CSV download response for a set of join requests.
pub(crate) fn csv_attachment(requests: &[JoinRequest]) -> impl IntoResponse + use<> {
    let body = join_requests_csv(requests.iter().map(JoinRequest::as_csv_row));
    let disposition = format!("attachment; filename=\"{}\"", export_filename(Utc::now()));
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
}

/// Mark a join request read.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<JoinRequest>> {
    let request = JoinRequestRepository::new(state.pool())
        .set_read_for_owner(JoinRequestId::new(id), user.id, true)
        .await
        .map_err(request_not_found)?;
    Ok(Json(request))
}

/// Mark a join request unread.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn mark_unread(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<JoinRequest>> {
    let request = JoinRequestRepository::new(state.pool())
        .set_read_for_owner(JoinRequestId::new(id), user.id, false)
        .await
        .map_err(request_not_found)?;
    Ok(Json(request))
}

/// Delete a join request.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_request(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    JoinRequestRepository::new(state.pool())
        .delete_for_owner(JoinRequestId::new(id), user.id)
        .await
        .map_err(request_not_found)?;
    info!(join_request_id = id, "Join request deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// A `mailto:` link addressed to the requester. Marks the request read.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn reply_link(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<ReplyLink>> {
    let request = JoinRequestRepository::new(state.pool())
        .set_read_for_owner(JoinRequestId::new(id), user.id, true)
        .await
        .map_err(request_not_found)?;

    Ok(Json(ReplyLink {
        mailto: reply_mailto(&request, &user.name),
    }))
}

fn reply_mailto(request: &JoinRequest, host_name: &str) -> String {
    mailto(
        request.email.as_str(),
        &format!("Re: {}", request.event_title),
        &format!(
            "Hi {},\n\nThanks for your interest in {}!\n\nBest,\n{}",
            request.name, request.event_title, host_name
        ),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use chrono::TimeZone;

    use countdown_core::{Email, EventId};

    use super::*;

    fn request() -> JoinRequest {
        JoinRequest {
            id: JoinRequestId::new(7),
            event_id: EventId::parse("aB3dE5gH").unwrap(),
            event_title: "Launch Party".to_owned(),
            name: "Sam \"The Rocket\" Lee".to_owned(),
            email: Email::parse("sam@example.com").unwrap(),
            phone: None,
            message: Some("Count me in".to_owned()),
            is_read: false,
            joined_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_reply_mailto() {
        let link = reply_mailto(&request(), "Ana");
        assert!(link.starts_with("mailto:sam@example.com?subject=Re%3A%20Launch%20Party&body="));
        assert!(link.contains("Ana"));
    }

    #[tokio::test]
    async fn test_csv_attachment() {
        let response = csv_attachment(&[request(), request()]).into_response();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\""));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("\"Sam \"\"The Rocket\"\" Lee\""));
    }
}
