//! Countdown event domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use countdown_core::countdown::CountdownSnapshot;
use countdown_core::{EventId, UserId};

/// A stored countdown event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CountdownEvent {
    pub id: EventId,
    /// Owning user; `None` for events created without an account.
    pub user_id: Option<UserId>,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub event_type: String,
    pub background_image: Option<String>,
    pub mobile_background_image: Option<String>,
    pub is_public: bool,
    pub allow_join: bool,
    /// Optimistic concurrency token, bumped on every update.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CountdownEvent {
    /// Countdown to this event at `now`.
    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> CountdownSnapshot {
        CountdownSnapshot::at(self.event_date, now)
    }

    /// Whether `user_id` owns this event.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }
}

/// Create/edit form payload.
///
/// On update `version` must echo the version the client loaded; a stale
/// value is rejected as a conflict.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub event_type: String,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub mobile_background_image: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub allow_join: bool,
    #[serde(default)]
    pub version: Option<i32>,
}

const fn default_true() -> bool {
    true
}

/// An event with its countdown, as listed on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct EventWithCountdown {
    #[serde(flatten)]
    pub event: CountdownEvent,
    pub countdown: CountdownSnapshot,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_event_input_defaults() {
        let input: EventInput = serde_json::from_str(
            r#"{"title":"Launch","event_date":"2030-01-01T00:00:00Z","event_type":"launch"}"#,
        )
        .unwrap();
        assert!(input.is_public);
        assert!(!input.allow_join);
        assert_eq!(input.version, None);
        assert_eq!(input.description, None);
    }
}
