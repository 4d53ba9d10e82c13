//! Admin contact inbox.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use countdown_core::{MessageFilter, MessageId, Page, PageRequest};

use crate::db::MessageRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{ContactMessage, MessageReply};
use crate::services::admin::{AdminService, ReplyOutcome};
use crate::state::AppState;

/// Inbox listing parameters.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub filter: MessageFilter,
    pub page: Option<u32>,
}

/// Reply body.
#[derive(Debug, Deserialize)]
pub struct ReplyForm {
    pub subject: String,
    pub body: String,
}

/// Messages matching a filter and search.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Page<ContactMessage>>> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let page = MessageRepository::new(state.pool())
        .list_paginated(search, query.filter, PageRequest::new(query.page))
        .await?;
    Ok(Json(page))
}

async fn set_read(state: &AppState, id: i32, is_read: bool) -> Result<Json<ContactMessage>> {
    let message = AdminService::new(state.pool(), state.settings_service())
        .set_message_read(MessageId::new(id), is_read)
        .await?;
    Ok(Json(message))
}

async fn set_archived(state: &AppState, id: i32, is_archived: bool) -> Result<Json<ContactMessage>> {
    let message = AdminService::new(state.pool(), state.settings_service())
        .set_message_archived(MessageId::new(id), is_archived)
        .await?;
    Ok(Json(message))
}

/// Mark a message read.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<ContactMessage>> {
    set_read(&state, id, true).await
}

/// Mark a message unread.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn mark_unread(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<ContactMessage>> {
    set_read(&state, id, false).await
}

/// Archive a message.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn archive(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<ContactMessage>> {
    set_archived(&state, id, true).await
}

/// Move a message back to the inbox.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn unarchive(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<ContactMessage>> {
    set_archived(&state, id, false).await
}

/// Delete a message and its replies.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    AdminService::new(state.pool(), state.settings_service())
        .delete_message(MessageId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a reply and return the `mailto:` link to send it.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn reply(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(form): Json<ReplyForm>,
) -> Result<(StatusCode, Json<ReplyOutcome>)> {
    let outcome = AdminService::new(state.pool(), state.settings_service())
        .reply_to_message(MessageId::new(id), &form.subject, &form.body)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Replies sent for a message, oldest first.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn replies(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Vec<MessageReply>>> {
    let id = MessageId::new(id);
    let messages = MessageRepository::new(state.pool());
    if messages.get(id).await?.is_none() {
        return Err(AppError::NotFound("message not found".to_owned()));
    }
    Ok(Json(messages.list_replies(id).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Uri;

    use super::*;

    #[test]
    fn test_message_query_filter() {
        let uri: Uri = "/api/admin/messages?filter=archived&page=2".parse().unwrap();
        let Query(query) = Query::<MessageQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.filter, MessageFilter::Archived);
        assert_eq!(query.page, Some(2));

        let uri: Uri = "/api/admin/messages".parse().unwrap();
        let Query(query) = Query::<MessageQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.filter, MessageFilter::All);
        assert_eq!(query.search, None);
    }
}
