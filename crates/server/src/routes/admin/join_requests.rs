//! Admin view of every join request.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::{info, instrument};

use countdown_core::Page;

use super::ListQuery;
use crate::db::JoinRequestRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::JoinRequest;
use crate::routes::dashboard::csv_attachment;
use crate::state::AppState;

/// One page of join requests across all events, newest first.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<JoinRequest>>> {
    let page = JoinRequestRepository::new(state.pool())
        .list_paginated(query.page_request())
        .await?;
    Ok(Json(page))
}

/// CSV of every join request.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn export(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let requests = JoinRequestRepository::new(state.pool()).list_all().await?;
    info!(count = requests.len(), "Exporting all join requests");
    Ok(csv_attachment(&requests))
}
