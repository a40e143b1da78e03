//! Stored comments.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ideabox_core::{CommentId, IdeaId, UserId};

/// A comment on an idea, with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub idea_id: IdeaId,
    pub content: String,
    pub user_id: UserId,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}
