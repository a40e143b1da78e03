//! Tag management and assignment (JSON API).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use ideabox_core::{IdeaNumber, NewTag, Role};

use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth, require_role};
use crate::models::Tag;
use crate::state::AppState;

/// Normalise a submitted tag the way the constructor does.
fn normalised(tag: &NewTag) -> NewTag {
    NewTag::new(&tag.name, &tag.color, tag.is_public)
}

/// List the tags the viewer may see.
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Vec<Tag>>> {
    let role = match user {
        Some(current) => state.store().get_user(current.id).await?.map(|u| u.role),
        None => None,
    };

    Ok(Json(state.tags().list(role).await?))
}

/// Create a tag.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(tag): Json<NewTag>,
) -> Result<(StatusCode, Json<Tag>)> {
    require_role(&state, &user, Role::Administrator).await?;

    let tag = state.tags().create(&normalised(&tag)).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// Edit the tag at `slug`.
#[instrument(skip_all, fields(user_id = %user.id, slug = %slug))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
    Json(tag): Json<NewTag>,
) -> Result<Json<Tag>> {
    require_role(&state, &user, Role::Administrator).await?;

    let tag = state.tags().update(&slug, &normalised(&tag)).await?;
    Ok(Json(tag))
}

/// Delete the tag at `slug`.
#[instrument(skip_all, fields(user_id = %user.id, slug = %slug))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    require_role(&state, &user, Role::Administrator).await?;

    state.tags().remove(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach a tag to an idea.
#[instrument(skip_all, fields(user_id = %user.id, number = number, slug = %slug))]
pub async fn assign(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((number, slug)): Path<(i32, String)>,
) -> Result<StatusCode> {
    let member = require_role(&state, &user, Role::Collaborator).await?;

    state
        .tags()
        .assign(&slug, IdeaNumber::new(number), member.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Detach a tag from an idea.
#[instrument(skip_all, fields(user_id = %user.id, number = number, slug = %slug))]
pub async fn unassign(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((number, slug)): Path<(i32, String)>,
) -> Result<StatusCode> {
    require_role(&state, &user, Role::Collaborator).await?;

    state.tags().unassign(&slug, IdeaNumber::new(number)).await?;
    Ok(StatusCode::NO_CONTENT)
}
