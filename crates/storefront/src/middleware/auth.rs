//! Authenticated-session extractors.
//!
//! The storefront never validates credentials itself: login stores the
//! commerce API's bearer token in the session, and these extractors pull
//! it back out per request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session::{SessionUser, session_keys};

/// Extractor for routes that require a logged-in shopper.
///
/// Rejects with 401 when the session holds no token.
pub struct AuthSession {
    /// The underlying session, for reading and writing other session data.
    pub session: Session,
    /// The logged-in user.
    pub user: SessionUser,
    /// Bearer token replayed on commerce API calls.
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_owned()))?;

        let token: Option<String> = session.get(session_keys::AUTH_TOKEN).await?;
        let user: Option<SessionUser> = session.get(session_keys::USER).await?;

        match (token, user) {
            (Some(token), Some(user)) => Ok(Self {
                session,
                user,
                token,
            }),
            _ => Err(AppError::Unauthorized("Please log in".to_owned())),
        }
    }
}

/// Extractor for routes that work either way but personalise when a
/// shopper is logged in.
pub struct MaybeUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_owned()))?;

        let user: Option<SessionUser> = session.get(session_keys::USER).await?;
        Ok(Self(user))
    }
}
