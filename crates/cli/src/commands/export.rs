//! Data export commands.
//!
//! # Usage
//!
//! ```bash
//! # Every join request
//! cd-cli export join-requests
//!
//! # One event, to a chosen file
//! cd-cli export join-requests --event-id aB3dE5gH -o guests.csv
//! ```

use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;

use countdown_core::EventId;
use countdown_core::csv::{export_filename, join_requests_csv};
use countdown_server::db::{JoinRequestRepository, RepositoryError};
use countdown_server::models::JoinRequest;

use super::{ConnectError, connect};

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Could not connect.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Malformed event ID.
    #[error("Invalid event ID: {0}")]
    InvalidEventId(String),

    /// Query failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Could not write the file.
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Keep only requests for `event_id`, when given.
fn filter_requests(requests: Vec<JoinRequest>, event_id: Option<&EventId>) -> Vec<JoinRequest> {
    match event_id {
        Some(id) => requests.into_iter().filter(|r| &r.event_id == id).collect(),
        None => requests,
    }
}

/// Write join requests to a CSV file and return its path.
///
/// # Errors
///
/// Returns an error if the event ID is malformed, the query fails, or the
/// file cannot be written.
pub async fn join_requests(
    event_id: Option<&str>,
    output: Option<PathBuf>,
) -> Result<PathBuf, ExportError> {
    let event_id = event_id
        .map(|id| EventId::parse(id).map_err(|_| ExportError::InvalidEventId(id.to_owned())))
        .transpose()?;

    let pool = connect().await?;
    let requests = JoinRequestRepository::new(&pool).list_all().await?;
    let requests = filter_requests(requests, event_id.as_ref());

    let path = output.unwrap_or_else(|| PathBuf::from(export_filename(Utc::now())));
    let csv = join_requests_csv(requests.iter().map(JoinRequest::as_csv_row));
    tokio::fs::write(&path, csv).await?;

    tracing::info!(count = requests.len(), path = %path.display(), "Join requests exported");
    Ok(path)
}
