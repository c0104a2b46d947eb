//! Authentication handlers.
//!
//! Credentials are verified by the commerce API; the storefront stores the
//! returned bearer token in the session and replays it on later calls.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::{info, instrument};

use marigold_core::Email;

use crate::commerce::types::{AuthResponse, GoogleSignupInput, LoginInput, SignupInput};
use crate::error::AppError;
use crate::middleware::AuthSession;
use crate::models::session::{SessionUser, session_keys};
use crate::state::AppState;

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/google`.
#[derive(Debug, Deserialize)]
pub struct GoogleRequest {
    pub credential: String,
}

/// Store an auth response in the session and build the client payload.
///
/// The session id is cycled on every credential change.
async fn establish_session(session: &Session, auth: AuthResponse) -> Result<Value, AppError> {
    session.cycle_id().await?;

    let user = SessionUser::from(auth.user);
    session.insert(session_keys::AUTH_TOKEN, &auth.token).await?;
    session.insert(session_keys::USER, &user).await?;

    info!(user_id = %user.id, "Session established");
    Ok(json!({ "user": user }))
}

/// `POST /auth/login`.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let email = Email::parse(&body.email).map_err(|e| AppError::Validation(e.to_string()))?;

    let auth = state
        .commerce()
        .login(&LoginInput {
            email: email.to_string(),
            password: body.password,
        })
        .await?;

    Ok(Json(establish_session(&session, auth).await?))
}

/// `POST /auth/register`.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let email = Email::parse(&body.email).map_err(|e| AppError::Validation(e.to_string()))?;
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Name must not be empty".to_owned()));
    }

    let auth = state
        .commerce()
        .signup(&SignupInput {
            name: body.name,
            email: email.to_string(),
            password: body.password,
        })
        .await?;

    Ok(Json(establish_session(&session, auth).await?))
}

/// `POST /auth/google` - sign in with a Google OAuth credential.
#[instrument(skip_all)]
pub async fn google(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<GoogleRequest>,
) -> Result<Json<Value>, AppError> {
    let auth = state
        .commerce()
        .google_signup(&GoogleSignupInput {
            credential: body.credential,
        })
        .await?;

    Ok(Json(establish_session(&session, auth).await?))
}

/// `POST /auth/logout`.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, auth: AuthSession) -> Result<Json<Value>, AppError> {
    // Invalidate the API-side token first, best effort.
    if let Err(e) = state.commerce().session(auth.token).logout().await {
        tracing::warn!(error = %e, "API-side logout failed");
    }

    auth.session.flush().await?;
    Ok(Json(json!({ "message": "Logged out" })))
}

/// `GET /auth/profile` - the current user, refreshed from the API.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<Value>, AppError> {
    let profile = state.commerce().session(auth.token).profile().await?;
    let user = SessionUser::from(profile.user);

    // Keep the session copy in step with the API.
    auth.session.insert(session_keys::USER, &user).await?;

    Ok(Json(json!({ "user": user })))
}
