//! Admin activity log repository.
//!
//! The log keeps only the newest entries. Writers serialize on a
//! transaction-scoped advisory lock, then insert and trim the tail in the
//! same transaction, so concurrent writers never leave more than
//! [`MAX_ADMIN_LOGS`] rows behind.

use sqlx::{PgConnection, PgPool};

use countdown_core::{AdminAction, Page, PageRequest};

use super::RepositoryError;
use crate::models::AdminLog;

/// Maximum number of retained log entries.
pub const MAX_ADMIN_LOGS: i64 = 100;

/// Advisory lock key guarding admin log writes.
const ADMIN_LOG_LOCK: i64 = 0x6164_6d69_6e6c_6f67;

/// Repository for the admin log.
pub struct AdminLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminLogRepository<'a> {
    /// Create a new admin log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry and trim the log, inside a caller-owned transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn record_in(
        conn: &mut PgConnection,
        action: AdminAction,
        description: &str,
    ) -> Result<AdminLog, RepositoryError> {
        Self::lock(conn).await?;

        let entry = sqlx::query_as::<_, AdminLog>(
            "INSERT INTO countdown.admin_log (action, description)
             VALUES ($1, $2)
             RETURNING id, action, description, created_at",
        )
        .bind(action.as_str())
        .bind(description)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "DELETE FROM countdown.admin_log
             WHERE id NOT IN (
                 SELECT id FROM countdown.admin_log
                 ORDER BY id DESC
                 LIMIT $1
             )",
        )
        .bind(MAX_ADMIN_LOGS)
        .execute(&mut *conn)
        .await?;

        Ok(entry)
    }

    /// One page of the log, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_paginated(&self, request: PageRequest) -> Result<Page<AdminLog>, RepositoryError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countdown.admin_log")
            .fetch_one(self.pool)
            .await?;
        let total = u64::try_from(total).unwrap_or_default();
        let request = request.clamped(total);

        let entries = sqlx::query_as::<_, AdminLog>(
            "SELECT id, action, description, created_at
             FROM countdown.admin_log
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(entries, request, total))
    }

    /// Delete every entry inside a caller-owned transaction. Returns the
    /// number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_in(conn: &mut PgConnection) -> Result<u64, RepositoryError> {
        Self::lock(conn).await?;
        let result = sqlx::query("DELETE FROM countdown.admin_log")
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Take the log's write lock until the surrounding transaction ends.
    async fn lock(conn: &mut PgConnection) -> Result<(), RepositoryError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMIN_LOG_LOCK)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
