//! Admin activity log entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use countdown_core::AdminLogId;

/// One recorded admin mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AdminLog {
    pub id: AdminLogId,
    /// Stored form of an `AdminAction`.
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
