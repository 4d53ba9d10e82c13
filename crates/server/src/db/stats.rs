//! Aggregate counts for the admin console and the user dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use countdown_core::UserId;

use super::RepositoryError;

/// Site-wide counts shown on the admin overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AdminStats {
    pub users: i64,
    pub events: i64,
    pub public_events: i64,
    pub upcoming_events: i64,
    pub join_requests: i64,
    pub unread_messages: i64,
}

/// Counts over one user's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
    pub total_events: i64,
    pub public_events: i64,
    pub upcoming_events: i64,
    pub expired_events: i64,
    pub join_requests: i64,
    pub unread_join_requests: i64,
}

/// Compute the admin overview counts.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn admin_stats(pool: &PgPool, now: DateTime<Utc>) -> Result<AdminStats, RepositoryError> {
    let stats = sqlx::query_as::<_, AdminStats>(
        "SELECT
             (SELECT COUNT(*) FROM countdown.app_user) AS users,
             (SELECT COUNT(*) FROM countdown.event) AS events,
             (SELECT COUNT(*) FROM countdown.event WHERE is_public) AS public_events,
             (SELECT COUNT(*) FROM countdown.event WHERE event_date > $1) AS upcoming_events,
             (SELECT COUNT(*) FROM countdown.join_request) AS join_requests,
             (SELECT COUNT(*) FROM countdown.contact_message
                 WHERE NOT is_read AND NOT is_archived) AS unread_messages",
    )
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

/// Compute a user's dashboard counts.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn dashboard_stats(
    pool: &PgPool,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<DashboardStats, RepositoryError> {
    let stats = sqlx::query_as::<_, DashboardStats>(
        "SELECT
             COUNT(*) AS total_events,
             COUNT(*) FILTER (WHERE e.is_public) AS public_events,
             COUNT(*) FILTER (WHERE e.event_date > $2) AS upcoming_events,
             COUNT(*) FILTER (WHERE e.event_date <= $2) AS expired_events,
             COALESCE(SUM(jr.total), 0)::BIGINT AS join_requests,
             COALESCE(SUM(jr.unread), 0)::BIGINT AS unread_join_requests
         FROM countdown.event e
         LEFT JOIN (
             SELECT event_id,
                    COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE NOT is_read) AS unread
             FROM countdown.join_request
             GROUP BY event_id
         ) jr ON jr.event_id = e.id
         WHERE e.user_id = $1",
    )
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}
