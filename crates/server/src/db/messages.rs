//! Contact message and reply repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use countdown_core::pagination::ilike_pattern;
use countdown_core::{Email, MessageCategory, MessageFilter, MessageId, Page, PageRequest};

use super::RepositoryError;
use crate::models::{ContactMessage, MessageReply};

const MESSAGE_COLUMNS: &str =
    "id, name, email, subject, category, message, is_read, is_archived, received_at";

/// Validated contact form fields.
#[derive(Debug, Clone)]
pub struct ContactFields {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub category: MessageCategory,
    pub message: String,
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: MessageId,
    name: String,
    email: Email,
    subject: String,
    category: String,
    message: String,
    is_read: bool,
    is_archived: bool,
    received_at: DateTime<Utc>,
}

impl From<MessageRow> for ContactMessage {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            // Unknown stored categories degrade to `general`
            category: MessageCategory::parse_lenient(&row.category),
            message: row.message,
            is_read: row.is_read,
            is_archived: row.is_archived,
            received_at: row.received_at,
        }
    }
}

/// SQL predicate for an inbox filter.
const fn filter_clause(filter: MessageFilter) -> &'static str {
    match filter {
        MessageFilter::All => "NOT is_archived",
        MessageFilter::Unread => "NOT is_archived AND NOT is_read",
        MessageFilter::Archived => "is_archived",
    }
}

/// Repository for contact messages.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a contact form submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, fields: &ContactFields) -> Result<ContactMessage, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "INSERT INTO countdown.contact_message (name, email, subject, category, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.subject)
        .bind(fields.category.as_str())
        .bind(&fields.message)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a message by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: MessageId) -> Result<Option<ContactMessage>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM countdown.contact_message WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Messages matching a filter and a search over name, email, subject
    /// and body, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_paginated(
        &self,
        search: Option<&str>,
        filter: MessageFilter,
        request: PageRequest,
    ) -> Result<Page<ContactMessage>, RepositoryError> {
        let pattern = ilike_pattern(search);
        let clause = filter_clause(filter);
        let search_clause =
            "(name ILIKE $1 OR email ILIKE $1 OR subject ILIKE $1 OR message ILIKE $1)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM countdown.contact_message WHERE {clause} AND {search_clause}"
        ))
        .bind(&pattern)
        .fetch_one(self.pool)
        .await?;
        let total = u64::try_from(total).unwrap_or_default();
        let request = request.clamped(total);

        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM countdown.contact_message
             WHERE {clause} AND {search_clause}
             ORDER BY received_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            request,
            total,
        ))
    }

    /// Set the read flag inside a caller-owned transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_read_in(
        conn: &mut PgConnection,
        id: MessageId,
        is_read: bool,
    ) -> Result<ContactMessage, RepositoryError> {
        Self::update_flag(conn, "is_read", id, is_read).await
    }

    /// Set the archived flag inside a caller-owned transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_archived_in(
        conn: &mut PgConnection,
        id: MessageId,
        is_archived: bool,
    ) -> Result<ContactMessage, RepositoryError> {
        Self::update_flag(conn, "is_archived", id, is_archived).await
    }

    async fn update_flag(
        conn: &mut PgConnection,
        column: &'static str,
        id: MessageId,
        value: bool,
    ) -> Result<ContactMessage, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "UPDATE countdown.contact_message SET {column} = $2
             WHERE id = $1
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(value)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a message inside a caller-owned transaction. Replies cascade.
    ///
    /// Returns the deleted message, or `None` if no such message existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_in(
        conn: &mut PgConnection,
        id: MessageId,
    ) -> Result<Option<ContactMessage>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "DELETE FROM countdown.contact_message WHERE id = $1 RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Number of unread, non-archived messages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_unread(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM countdown.contact_message WHERE {}",
            filter_clause(MessageFilter::Unread)
        ))
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Record a reply and mark the message read, inside a caller-owned
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message doesn't exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_reply_in(
        conn: &mut PgConnection,
        message_id: MessageId,
        subject: &str,
        body: &str,
    ) -> Result<MessageReply, RepositoryError> {
        let updated = sqlx::query("UPDATE countdown.contact_message SET is_read = TRUE WHERE id = $1")
            .bind(message_id)
            .execute(&mut *conn)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let reply = sqlx::query_as::<_, MessageReply>(
            "INSERT INTO countdown.message_reply (message_id, subject, body)
             VALUES ($1, $2, $3)
             RETURNING id, message_id, subject, body, replied_at",
        )
        .bind(message_id)
        .bind(subject)
        .bind(body)
        .fetch_one(&mut *conn)
        .await?;

        Ok(reply)
    }

    /// Replies to a message, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_replies(&self, message_id: MessageId) -> Result<Vec<MessageReply>, RepositoryError> {
        let replies = sqlx::query_as::<_, MessageReply>(
            "SELECT id, message_id, subject, body, replied_at
             FROM countdown.message_reply
             WHERE message_id = $1
             ORDER BY replied_at ASC, id ASC",
        )
        .bind(message_id)
        .fetch_all(self.pool)
        .await?;

        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clauses() {
        assert_eq!(filter_clause(MessageFilter::All), "NOT is_archived");
        assert!(filter_clause(MessageFilter::Unread).contains("NOT is_read"));
        assert_eq!(filter_clause(MessageFilter::Archived), "is_archived");
    }
}
