//! Admin event moderation.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use countdown_core::Page;

use super::ListQuery;
use crate::db::EventRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::CountdownEvent;
use crate::routes::events::parse_event_id;
use crate::services::admin::AdminService;
use crate::state::AppState;

/// Body for changing an event's visibility.
#[derive(Debug, Deserialize)]
pub struct VisibilityForm {
    pub is_public: bool,
}

/// Events matching a title search.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<CountdownEvent>>> {
    let page = EventRepository::new(state.pool())
        .list_paginated(query.search(), query.page_request())
        .await?;
    Ok(Json(page))
}

/// Delete any event.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_event_id(&id)?;
    AdminService::new(state.pool(), state.settings_service())
        .delete_event(&id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Show or hide an event in the public gallery.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn set_visibility(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Json(form): Json<VisibilityForm>,
) -> Result<Json<CountdownEvent>> {
    let id = parse_event_id(&id)?;
    let event = AdminService::new(state.pool(), state.settings_service())
        .set_event_visibility(&id, form.is_public)
        .await?;
    Ok(Json(event))
}
