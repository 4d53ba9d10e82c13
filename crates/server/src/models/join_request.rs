//! Join request domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use countdown_core::csv::JoinRequestRow;
use countdown_core::{Email, EventId, JoinRequestId};

/// A visitor's request to join an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct JoinRequest {
    pub id: JoinRequestId,
    pub event_id: EventId,
    /// Title of the event at the time of joining.
    pub event_title: String,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub is_read: bool,
    pub joined_at: DateTime<Utc>,
}

impl JoinRequest {
    /// Borrow this request as a CSV export row.
    #[must_use]
    pub fn as_csv_row(&self) -> JoinRequestRow<'_> {
        JoinRequestRow {
            event_title: &self.event_title,
            name: &self.name,
            email: self.email.as_str(),
            phone: self.phone.as_deref(),
            message: self.message.as_deref(),
            joined_at: self.joined_at,
        }
    }
}

/// Join form payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJoinRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
