//! User repository for database operations.

use sqlx::{PgConnection, PgPool};

use countdown_core::pagination::ilike_pattern;
use countdown_core::{Email, Page, PageRequest, UserId};

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, is_admin, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: Option<String>,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM countdown.app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their (normalized) email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM countdown.app_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO countdown.app_user (email, name, is_admin)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(name)
        .bind(is_admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "email already exists"))?;

        sqlx::query(
            "INSERT INTO countdown.user_password (user_id, password_hash)
             VALUES ($1, $2)",
        )
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHash>(
            "SELECT u.id, u.email, u.name, u.is_admin, u.created_at, p.password_hash
             FROM countdown.app_user u
             LEFT JOIN countdown.user_password p ON u.id = p.user_id
             WHERE u.email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.and_then(|r| r.password_hash.map(|hash| (r.user, hash))))
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO countdown.user_password (user_id, password_hash)
             VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET password_hash = $2, updated_at = NOW()",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countdown.app_user")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Whether the user is currently an admin. `None` if the user is gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_admin(&self, id: UserId) -> Result<Option<bool>, RepositoryError> {
        let is_admin =
            sqlx::query_scalar::<_, bool>("SELECT is_admin FROM countdown.app_user WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(is_admin)
    }

    /// List users matching a search term (name or email), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_paginated(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<User>, RepositoryError> {
        let pattern = ilike_pattern(search);

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM countdown.app_user WHERE name ILIKE $1 OR email ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(self.pool)
        .await?;
        let total = u64::try_from(total).unwrap_or_default();
        let request = request.clamped(total);

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM countdown.app_user
             WHERE name ILIKE $1 OR email ILIKE $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(users, request, total))
    }

    /// Set or clear the admin flag inside a caller-owned transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_admin_in(
        conn: &mut PgConnection,
        id: UserId,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE countdown.app_user SET is_admin = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(is_admin)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a user inside a caller-owned transaction.
    ///
    /// Their password, events and (through events) join requests cascade.
    /// Returns the deleted user, or `None` if no such user existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_in(
        conn: &mut PgConnection,
        id: UserId,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM countdown.app_user WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(user)
    }
}
