//! Sign-in by emailed link.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, set_sentry_user};
use crate::middleware::set_current_user;
use crate::state::AppState;

/// Sign-in request, as JSON or form data.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
}

/// Query string of the emailed link.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub k: String,
}

/// "Check your inbox" page.
#[derive(Template, WebTemplate)]
#[template(path = "signin/sent.html")]
pub struct SentTemplate {
    pub email: String,
}

/// Email a sign-in link (JSON API).
#[instrument(skip_all)]
pub async fn request(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<StatusCode> {
    state.sign_in().request(&request.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Email a sign-in link (HTML form).
#[instrument(skip_all)]
pub async fn request_form(
    State(state): State<AppState>,
    Form(form): Form<SignInRequest>,
) -> Result<SentTemplate> {
    state.sign_in().request(&form.email).await?;
    Ok(SentTemplate {
        email: form.email.trim().to_owned(),
    })
}

/// Complete sign-in from the emailed link.
#[instrument(skip_all)]
pub async fn verify(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<VerifyQuery>,
) -> Result<impl IntoResponse> {
    let user = state.sign_in().verify(&query.k).await?;

    set_current_user(&session, &user.to_current()).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Redirect::to("/"))
}
