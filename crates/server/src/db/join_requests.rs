//! Join request repository.
//!
//! Owner-scoped queries join through `countdown.event` so a user can only
//! ever see or touch requests for events they own.

use sqlx::PgPool;

use countdown_core::{Email, EventId, JoinRequestId, Page, PageRequest, UserId};

use super::RepositoryError;
use crate::models::{CountdownEvent, JoinRequest};

const JOIN_REQUEST_COLUMNS: &str =
    "jr.id, jr.event_id, jr.event_title, jr.name, jr.email, jr.phone, jr.message, jr.is_read, jr.joined_at";

/// Validated join form fields.
#[derive(Debug, Clone)]
pub struct JoinRequestFields {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub message: Option<String>,
}

/// Repository for join requests.
pub struct JoinRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> JoinRequestRepository<'a> {
    /// Create a new join request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a join request, capturing the event's current title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the event was deleted meanwhile.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        event: &CountdownEvent,
        fields: &JoinRequestFields,
    ) -> Result<JoinRequest, RepositoryError> {
        sqlx::query_as::<_, JoinRequest>(
            "INSERT INTO countdown.join_request AS jr (event_id, event_title, name, email, phone, message)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING jr.id, jr.event_id, jr.event_title, jr.name, jr.email, jr.phone,
                       jr.message, jr.is_read, jr.joined_at",
        )
        .bind(&event.id)
        .bind(&event.title)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(fields.phone.as_deref())
        .bind(fields.message.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })
    }

    /// Join requests for events owned by `owner`, newest first, optionally
    /// narrowed to a single event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(
        &self,
        owner: UserId,
        event_id: Option<&EventId>,
    ) -> Result<Vec<JoinRequest>, RepositoryError> {
        let requests = sqlx::query_as::<_, JoinRequest>(&format!(
            "SELECT {JOIN_REQUEST_COLUMNS}
             FROM countdown.join_request jr
             JOIN countdown.event e ON e.id = jr.event_id
             WHERE e.user_id = $1 AND ($2::TEXT IS NULL OR jr.event_id = $2)
             ORDER BY jr.joined_at DESC, jr.id DESC"
        ))
        .bind(owner)
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(requests)
    }

    /// Number of unread requests across the owner's events.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count_for_owner(&self, owner: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)
             FROM countdown.join_request jr
             JOIN countdown.event e ON e.id = jr.event_id
             WHERE e.user_id = $1 AND NOT jr.is_read",
        )
        .bind(owner)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Mark an owner's request read or unread.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request doesn't exist or
    /// belongs to someone else's event.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_read_for_owner(
        &self,
        id: JoinRequestId,
        owner: UserId,
        is_read: bool,
    ) -> Result<JoinRequest, RepositoryError> {
        sqlx::query_as::<_, JoinRequest>(&format!(
            "UPDATE countdown.join_request jr SET is_read = $3
             FROM countdown.event e
             WHERE jr.id = $1 AND e.id = jr.event_id AND e.user_id = $2
             RETURNING {JOIN_REQUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(is_read)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an owner's request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request doesn't exist or
    /// belongs to someone else's event.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_for_owner(&self, id: JoinRequestId, owner: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM countdown.join_request jr
             USING countdown.event e
             WHERE jr.id = $1 AND e.id = jr.event_id AND e.user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Every join request, newest first. Used by the admin export.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<JoinRequest>, RepositoryError> {
        let requests = sqlx::query_as::<_, JoinRequest>(&format!(
            "SELECT {JOIN_REQUEST_COLUMNS}
             FROM countdown.join_request jr
             ORDER BY jr.joined_at DESC, jr.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(requests)
    }

    /// One page of all join requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_paginated(&self, request: PageRequest) -> Result<Page<JoinRequest>, RepositoryError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countdown.join_request")
            .fetch_one(self.pool)
            .await?;
        let total = u64::try_from(total).unwrap_or_default();
        let request = request.clamped(total);

        let requests = sqlx::query_as::<_, JoinRequest>(&format!(
            "SELECT {JOIN_REQUEST_COLUMNS}
             FROM countdown.join_request jr
             ORDER BY jr.joined_at DESC, jr.id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(requests, request, total))
    }
}
