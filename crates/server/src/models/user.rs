//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use countdown_core::{Email, UserId};

/// A registered user.
///
/// The password hash lives in a separate table and is never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Lowercased email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Whether the user can access the admin console.
    pub is_admin: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}
