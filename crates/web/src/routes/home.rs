//! Home page: the idea input and the latest ideas.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Idea};
use crate::state::AppState;
use crate::widget::{IdeaInput, IdeaInputView};

use super::ideas::load_draft;

/// Placeholder shown in the empty title input.
pub const PLACEHOLDER: &str = "Enter your suggestion here...";

/// How many ideas the home page lists.
const RECENT_IDEAS: u32 = 30;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub input: IdeaInputView,
    pub ideas: Vec<Idea>,
}

/// Display the home page.
///
/// The title and description are restored from the session draft.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    let cache = load_draft(&session).await?;
    let input = IdeaInput::new(PLACEHOLDER, user.clone(), cache, (), ());

    render(&state, user, input.view(), StatusCode::OK).await
}

/// Render the home page around a widget view.
pub(crate) async fn render(
    state: &AppState,
    user: Option<CurrentUser>,
    input: IdeaInputView,
    status: StatusCode,
) -> Result<Response> {
    let ideas = state.store().recent_ideas(RECENT_IDEAS).await?;

    Ok((status, HomeTemplate { user, input, ideas }).into_response())
}
