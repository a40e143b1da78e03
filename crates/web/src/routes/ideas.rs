//! Idea submission, display, and follow-up.
//!
//! The session holds the server-side copy of the widget's draft cache, under
//! the same keys the widget uses client-side. Editing an idea and responding
//! to it take a collaborator; commenting takes any signed-in member.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ideabox_core::{IdeaCreated, IdeaNumber, NewComment, NewResponse, Role};

use super::home::{self, PLACEHOLDER};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth, require_role};
use crate::models::{Comment, CurrentUser, Idea, Tag, session_keys};
use crate::state::AppState;
use crate::widget::{DraftCache, IdeaInput, MemoryDraftCache, Page, SubmitOutcome};

const DRAFT_KEYS: [&str; 2] = [session_keys::DRAFT_TITLE, session_keys::DRAFT_DESCRIPTION];

/// Idea form data, shared by the HTML form and the JSON API.
#[derive(Debug, Deserialize)]
pub struct IdeaForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Idea detail template.
#[derive(Template, WebTemplate)]
#[template(path = "ideas/show.html")]
pub struct ShowTemplate {
    pub user: Option<CurrentUser>,
    pub idea: Idea,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
}

/// Page host for a server-side form submit: navigation becomes a redirect.
///
/// Focus and the sign-in prompt have no meaning without a browser.
#[derive(Debug, Default)]
pub struct RedirectPage {
    pub location: Option<String>,
}

impl Page for RedirectPage {
    fn focus_title(&mut self) {}

    fn blur_title(&mut self) {}

    fn show_sign_in(&mut self) {}

    fn navigate(&mut self, url: &str) {
        self.location = Some(url.to_owned());
    }
}

/// Read the session draft into a widget cache.
pub(crate) async fn load_draft(session: &Session) -> Result<MemoryDraftCache> {
    let cache = MemoryDraftCache::new();
    for key in DRAFT_KEYS {
        if let Some(value) = session.get::<String>(key).await? {
            cache.set_cache(key, &value);
        }
    }
    Ok(cache)
}

/// Write a widget cache back to the session; missing keys are removed.
async fn store_draft(session: &Session, cache: &MemoryDraftCache) -> Result<()> {
    for key in DRAFT_KEYS {
        match cache.get_cache(key) {
            Some(value) => session.insert(key, value).await?,
            None => {
                session.remove_value(key).await?;
            }
        }
    }
    Ok(())
}

/// Save the draft without submitting it.
#[instrument(skip_all)]
pub async fn save_draft(session: Session, Form(form): Form<IdeaForm>) -> Result<StatusCode> {
    let mut input = IdeaInput::new(PLACEHOLDER, None, load_draft(&session).await?, (), ());
    input.on_title_changed(form.title);
    input.on_description_changed(form.description);
    store_draft(&session, input.cache()).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Submit the idea form.
///
/// Success redirects to the new idea; a rejected idea re-renders the home
/// page with the failure and keeps the draft.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<IdeaForm>,
) -> Result<Response> {
    let mut input = IdeaInput::new(
        PLACEHOLDER,
        Some(user.clone()),
        load_draft(&session).await?,
        state.ideas_for(user.id),
        RedirectPage::default(),
    );
    input.on_title_changed(form.title);
    input.on_description_changed(form.description);

    let outcome = input.submit().await;
    store_draft(&session, input.cache()).await?;

    match outcome {
        SubmitOutcome::Created(created) => {
            let location = input
                .page()
                .location
                .clone()
                .unwrap_or_else(|| created.redirect_path());
            Ok(Redirect::to(&location).into_response())
        }
        SubmitOutcome::Skipped => Ok(Redirect::to("/").into_response()),
        SubmitOutcome::Failed(_) => {
            home::render(&state, Some(user), input.view(), StatusCode::BAD_REQUEST).await
        }
    }
}

/// Create an idea (JSON API used by the widget).
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(form): Json<IdeaForm>,
) -> Result<(StatusCode, Json<IdeaCreated>)> {
    let idea = state
        .ideas_for(user.id)
        .create(&form.title, &form.description)
        .await?;

    for key in DRAFT_KEYS {
        session.remove_value(key).await?;
    }

    Ok((StatusCode::CREATED, Json(idea.created())))
}

/// Edit an idea's title and description.
#[instrument(skip_all, fields(user_id = %user.id, number = number))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(number): Path<i32>,
    Json(form): Json<IdeaForm>,
) -> Result<Json<Idea>> {
    require_role(&state, &user, Role::Collaborator).await?;

    let idea = state
        .ideas_for(user.id)
        .update(IdeaNumber::new(number), &form.title, &form.description)
        .await?;

    Ok(Json(idea))
}

/// Comment on an idea.
#[instrument(skip_all, fields(user_id = %user.id, number = number))]
pub async fn comment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(number): Path<i32>,
    Json(form): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>)> {
    let comment = state
        .ideas_for(user.id)
        .comment(IdeaNumber::new(number), &form.content)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Set an idea's status and response text.
#[instrument(skip_all, fields(user_id = %user.id, number = number))]
pub async fn respond(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(number): Path<i32>,
    Json(response): Json<NewResponse>,
) -> Result<Json<Idea>> {
    require_role(&state, &user, Role::Collaborator).await?;

    let idea = state
        .ideas_for(user.id)
        .respond(IdeaNumber::new(number), &response)
        .await?;

    Ok(Json(idea))
}

/// Display an idea.
///
/// A stale or mistyped slug redirects to the canonical URL.
#[instrument(skip_all, fields(number = number))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path((number, slug)): Path<(i32, String)>,
) -> Result<Response> {
    let idea = state
        .store()
        .get_idea_by_number(IdeaNumber::new(number))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("idea {number}")))?;

    if idea.slug.as_str() != slug {
        return Ok(Redirect::permanent(&idea.created().redirect_path()).into_response());
    }

    let role = match &user {
        Some(current) => state.store().get_user(current.id).await?.map(|u| u.role),
        None => None,
    };
    let tags = state.tags().for_idea(&idea, role).await?;
    let comments = state.store().comments_for(idea.id).await?;

    Ok(ShowTemplate {
        user,
        idea,
        tags,
        comments,
    }
    .into_response())
}
