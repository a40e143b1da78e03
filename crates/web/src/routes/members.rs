//! Member administration (JSON API).

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use ideabox_core::{Role, UserId};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, require_role};
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// Change a member's role.
///
/// Administrators cannot demote themselves, so a board always keeps at
/// least the administrator making changes.
#[instrument(skip_all, fields(user_id = %user.id, member_id = id))]
pub async fn set_role(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<User>> {
    let admin = require_role(&state, &user, Role::Administrator).await?;
    let target = UserId::new(id);

    if target == admin.id && request.role != Role::Administrator {
        return Err(AppError::Forbidden(
            "administrators cannot demote themselves".to_owned(),
        ));
    }

    let member = state
        .store()
        .set_user_role(target, request.role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("user {id}")),
            other => AppError::Database(other),
        })?;

    tracing::info!(member_id = %member.id, role = %member.role, "Role changed");
    Ok(Json(member))
}
