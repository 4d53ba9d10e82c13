//! Authentication extractors.
//!
//! Both extractors confirm the session's account against the database on
//! every request, so deleting a user or revoking admin access takes effect
//! immediately. A session whose account is gone is cleared and rejected.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;
use tracing::warn;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::models::session::keys;
use crate::state::AppState;

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Session user plus the account's current admin flag.
///
/// `None` when nobody is logged in or the account no longer exists.
async fn live_user(parts: &Parts, state: &AppState) -> Result<Option<(CurrentUser, bool)>, AppError> {
    let Some(user) = current_user(parts).await else {
        return Ok(None);
    };

    match UserRepository::new(state.pool()).is_admin(user.id).await? {
        Some(is_admin) => Ok(Some((user, is_admin))),
        None => {
            if let Some(session) = parts.extensions.get::<Session>() {
                clear_current_user(session)
                    .await
                    .unwrap_or_else(|e| warn!(error = %e, "Failed to clear session of deleted user"));
            }
            Ok(None)
        }
    }
}

/// Extractor that requires a logged-in user with an existing account.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        live_user(parts, state)
            .await?
            .map(|(user, _)| Self(user))
            .ok_or_else(|| AppError::Unauthorized("Please log in".to_owned()))
    }
}

/// Extractor that requires a logged-in user whose account is currently an admin.
///
/// Rejects with 401 when not logged in (or the account no longer exists)
/// and 403 when the account is not an admin.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match live_user(parts, state).await? {
            Some((user, true)) => Ok(Self(user)),
            Some((_, false)) => Err(AppError::Forbidden("Admin access required".to_owned())),
            None => Err(AppError::Unauthorized("Please log in".to_owned())),
        }
    }
}

/// Helper to set the current user in the session.
///
/// Cycles the session ID first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(keys::CURRENT_USER).await?;
    Ok(())
}
