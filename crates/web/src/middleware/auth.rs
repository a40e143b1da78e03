//! Authentication extractors.
//!
//! The signed-in user is a [`CurrentUser`] stored in the session by the
//! sign-in flow.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use ideabox_core::{Failure, Role};

use crate::error::AppError;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// API requests are rejected with `401` and a JSON [`Failure`]; page
/// requests are sent back to the home page, where the sign-in prompt lives.
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
pub enum AuthRejection {
    RedirectHome,
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(Failure::message("Please sign in to continue.")),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers see a stripped path.
        let is_api = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0)
            .path()
            .starts_with("/api/");
        let rejection = || {
            if is_api {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectHome
            }
        };

        let session = parts.extensions.get::<Session>().ok_or_else(rejection)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(rejection)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the signed-in user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the signed-in user in the session.
///
/// The session id is rotated first so a pre-sign-in cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Check that the signed-in user holds at least `role`.
///
/// The role is read from storage rather than the session, so a promotion or
/// demotion applies to the next request.
///
/// # Errors
///
/// Returns `Unauthorized` if the account no longer exists, `Forbidden` if its
/// role is too low, or `Database` if it cannot be loaded.
pub async fn require_role(
    state: &AppState,
    user: &CurrentUser,
    role: Role,
) -> Result<User, AppError> {
    let member = state
        .store()
        .get_user(user.id)
        .await?
        .ok_or_else(|| {
            AppError::Unauthorized(format!("user {} no longer exists", user.id))
        })?;

    if member.role < role {
        tracing::warn!(
            user_id = %member.id,
            role = %member.role,
            required = %role,
            "Role too low"
        );
        return Err(AppError::Forbidden(format!("{role} required")));
    }

    Ok(member)
}
