//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before a sanitized response is sent; validation
//! failures are returned as a JSON [`Failure`] so the idea input widget can
//! show them inline.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use ideabox_core::Failure;

use crate::db::RepositoryError;
use crate::services::ideas::IdeaError;
use crate::services::signin::SignInError;
use crate::services::tags::TagError;

/// Application-level error type for the board.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Sign-in flow failed.
    #[error("Sign-in error: {0}")]
    SignIn(#[from] SignInError),

    /// Submitted data did not pass validation.
    #[error("Validation failed: {0}")]
    Validation(Failure),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not signed in, or their account no longer exists.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Signed in, but the role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SignIn(err) => match err {
                SignInError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                SignInError::InvalidKey => StatusCode::GONE,
                SignInError::Mail(_) => StatusCode::BAD_GATEWAY,
                SignInError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// The failure shown to the user; internal details are never exposed.
    fn failure(self) -> Failure {
        match self {
            Self::Validation(failure) => failure,
            Self::Database(_) | Self::Session(_) => {
                Failure::message("Something went wrong. Please try again.")
            }
            Self::SignIn(err) => match err {
                SignInError::InvalidEmail(_) => Failure::field("email", "Email is invalid."),
                SignInError::InvalidKey => {
                    Failure::message("This sign-in link is invalid or has expired.")
                }
                SignInError::Mail(_) => {
                    Failure::message("We could not send the sign-in email. Please try again.")
                }
                SignInError::Repository(_) => {
                    Failure::message("Something went wrong. Please try again.")
                }
            },
            Self::NotFound(what) => Failure::message(format!("Not found: {what}")),
            Self::Unauthorized(_) => Failure::message("Please sign in to continue."),
            Self::Forbidden(_) => Failure::message("You are not allowed to do that."),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.failure())).into_response()
    }
}

impl From<IdeaError> for AppError {
    fn from(err: IdeaError) -> Self {
        match err {
            IdeaError::Invalid(failure) => Self::Validation(failure),
            IdeaError::NotFound(number) => Self::NotFound(format!("idea {number}")),
            IdeaError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<TagError> for AppError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::Invalid(failure) => Self::Validation(failure),
            TagError::TagNotFound(slug) => Self::NotFound(format!("tag {slug}")),
            TagError::IdeaNotFound(number) => Self::NotFound(format!("idea {number}")),
            TagError::Repository(e) => Self::Database(e),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
