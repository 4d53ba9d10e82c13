//! Contact form route handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use countdown_core::MessageId;

use crate::error::Result;
use crate::models::NewContactMessage;
use crate::services::contact;
use crate::state::AppState;

/// Acknowledgement returned to the sender.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub id: MessageId,
}

/// Store a contact form submission for the admin inbox.
#[instrument(skip(state, input), fields(email = %input.email))]
pub async fn submit(
    State(state): State<AppState>,
    Json(input): Json<NewContactMessage>,
) -> Result<(StatusCode, Json<ContactResponse>)> {
    let message = contact::submit(state.pool(), &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            success: true,
            id: message.id,
        }),
    ))
}
