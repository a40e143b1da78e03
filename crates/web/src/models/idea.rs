//! Stored idea.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ideabox_core::{IdeaCreated, IdeaId, IdeaNumber, IdeaStatus, Slug, UserId};

/// An idea as stored on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Idea {
    pub id: IdeaId,
    pub number: IdeaNumber,
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub user_id: UserId,
    pub status: IdeaStatus,
    pub response: Option<IdeaResponse>,
    pub created_at: DateTime<Utc>,
}

/// The latest collaborator response to an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaResponse {
    pub text: String,
    pub user_id: UserId,
    pub responded_at: DateTime<Utc>,
}

impl Idea {
    /// Identifiers handed back to the submitter.
    #[must_use]
    pub fn created(&self) -> IdeaCreated {
        IdeaCreated {
            number: self.number,
            slug: self.slug.clone(),
        }
    }
}
