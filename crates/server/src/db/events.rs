//! Countdown event repository.
//!
//! Every write is a single-row statement. Updates are guarded by the
//! `version` column: an update carries the version the client loaded and
//! bumps it, so a concurrent edit turns into `RepositoryError::Conflict`
//! instead of a lost write.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use countdown_core::pagination::ilike_pattern;
use countdown_core::{EventId, Page, PageRequest, UserId};

use super::RepositoryError;
use crate::models::CountdownEvent;

const EVENT_COLUMNS: &str = "id, user_id, title, description, event_date, event_type, \
     background_image, mobile_background_image, is_public, allow_join, version, \
     created_at, updated_at";

/// Attempts at finding an unused random ID before giving up.
const MAX_ID_ATTEMPTS: usize = 5;

/// Validated, user-editable event fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub event_type: String,
    pub background_image: Option<String>,
    pub mobile_background_image: Option<String>,
    pub is_public: bool,
    pub allow_join: bool,
}

/// Filter for the public gallery.
#[derive(Debug, Clone, Default)]
pub struct PublicEventFilter {
    /// Only events of this type.
    pub event_type: Option<String>,
    /// Only events whose date is after this instant.
    pub upcoming_after: Option<DateTime<Utc>>,
}

/// Repository for countdown events.
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an event by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: &EventId) -> Result<Option<CountdownEvent>, RepositoryError> {
        let event = sqlx::query_as::<_, CountdownEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM countdown.event WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(event)
    }

    /// Insert a new event under a freshly generated ID.
    ///
    /// A primary-key collision is retried with a new ID, up to a fixed
    /// number of attempts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if every attempt collided.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        owner: Option<UserId>,
        fields: &EventFields,
    ) -> Result<CountdownEvent, RepositoryError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = EventId::generate(&mut rand::rng());

            let result = sqlx::query_as::<_, CountdownEvent>(&format!(
                "INSERT INTO countdown.event
                     (id, user_id, title, description, event_date, event_type,
                      background_image, mobile_background_image, is_public, allow_join)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 RETURNING {EVENT_COLUMNS}"
            ))
            .bind(&id)
            .bind(owner)
            .bind(&fields.title)
            .bind(fields.description.as_deref())
            .bind(fields.event_date)
            .bind(&fields.event_type)
            .bind(fields.background_image.as_deref())
            .bind(fields.mobile_background_image.as_deref())
            .bind(fields.is_public)
            .bind(fields.allow_join)
            .fetch_one(self.pool)
            .await;

            match result {
                Ok(event) => return Ok(event),
                Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                    tracing::warn!(event_id = %id, attempt, "Event ID collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RepositoryError::Conflict(
            "could not allocate a unique event id".to_owned(),
        ))
    }

    /// Overwrite an event's fields if its version still matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the event doesn't exist.
    /// Returns `RepositoryError::Conflict` if `expected_version` is stale.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: &EventId,
        expected_version: i32,
        fields: &EventFields,
    ) -> Result<CountdownEvent, RepositoryError> {
        let updated = sqlx::query_as::<_, CountdownEvent>(&format!(
            "UPDATE countdown.event SET
                 title = $3, description = $4, event_date = $5, event_type = $6,
                 background_image = $7, mobile_background_image = $8,
                 is_public = $9, allow_join = $10,
                 version = version + 1, updated_at = NOW()
             WHERE id = $1 AND version = $2
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(expected_version)
        .bind(&fields.title)
        .bind(fields.description.as_deref())
        .bind(fields.event_date)
        .bind(&fields.event_type)
        .bind(fields.background_image.as_deref())
        .bind(fields.mobile_background_image.as_deref())
        .bind(fields.is_public)
        .bind(fields.allow_join)
        .fetch_optional(self.pool)
        .await?;

        if let Some(event) = updated {
            return Ok(event);
        }

        // Zero rows: either the event is gone or someone else saved first
        match self.get_by_id(id).await? {
            Some(current) => Err(RepositoryError::Conflict(format!(
                "event was modified (current version {}, expected {expected_version})",
                current.version
            ))),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Delete an event. Join requests cascade.
    ///
    /// Returns `false` if no such event existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: &EventId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::delete_in(&mut conn, id).await
    }

    /// Delete an event inside a caller-owned transaction.
    ///
    /// Returns `false` if no such event existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_in(
        conn: &mut PgConnection,
        id: &EventId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM countdown.event WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Public events for the gallery, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_public(
        &self,
        filter: &PublicEventFilter,
    ) -> Result<Vec<CountdownEvent>, RepositoryError> {
        let events = sqlx::query_as::<_, CountdownEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM countdown.event
             WHERE is_public
               AND ($1::TEXT IS NULL OR event_type = $1)
               AND ($2::TIMESTAMPTZ IS NULL OR event_date > $2)
             ORDER BY event_date ASC, id ASC"
        ))
        .bind(filter.event_type.as_deref())
        .bind(filter.upcoming_after)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    /// A user's own events, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CountdownEvent>, RepositoryError> {
        let events = sqlx::query_as::<_, CountdownEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM countdown.event
             WHERE user_id = $1
             ORDER BY created_at DESC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    /// Number of events a user owns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countdown.event WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// All events matching a title search, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_paginated(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<CountdownEvent>, RepositoryError> {
        let pattern = ilike_pattern(search);

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM countdown.event WHERE title ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(self.pool)
        .await?;
        let total = u64::try_from(total).unwrap_or_default();
        let request = request.clamped(total);

        let events = sqlx::query_as::<_, CountdownEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM countdown.event
             WHERE title ILIKE $1
             ORDER BY created_at DESC, id ASC
             LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(events, request, total))
    }

    /// Show or hide an event in the public gallery, inside a caller-owned
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the event doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_visibility_in(
        conn: &mut PgConnection,
        id: &EventId,
        is_public: bool,
    ) -> Result<CountdownEvent, RepositoryError> {
        sqlx::query_as::<_, CountdownEvent>(&format!(
            "UPDATE countdown.event
             SET is_public = $2, version = version + 1, updated_at = NOW()
             WHERE id = $1
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(is_public)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
