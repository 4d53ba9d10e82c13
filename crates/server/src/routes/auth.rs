//! Authentication route handlers.
//!
//! Register, login and logout operate on the `current_user` session key;
//! the session ID is cycled on every login.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

async fn start_session(session: &Session, user: &User) -> Result<CurrentUser> {
    let current = CurrentUser::from(user);
    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store session: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(current)
}

/// Create an account and log it in.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<CurrentUser>)> {
    if !state.settings().await?.allow_registration {
        return Err(AuthError::RegistrationDisabled.into());
    }

    let user = AuthService::new(state.pool())
        .register(&form.email, &form.password, &form.name)
        .await?;
    let current = start_session(&session, &user).await?;

    info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(current)))
}

/// Log in with email and password.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<CurrentUser>> {
    let user = AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await?;
    let current = start_session(&session, &user).await?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(current))
}

/// Log out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to clear session: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user.
pub async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}
