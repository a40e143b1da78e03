//! Storage for ideas, users, and sign-in verifications.
//!
//! # Tables
//!
//! - `users` - Board members, keyed by email, with their role
//! - `ideas` - Submitted ideas with their public sequential number, status,
//!   and latest response
//! - `comments` - Comments on ideas
//! - `tags` - Labels, unique by slug
//! - `idea_tags` - Tag assignments (removed with their tag)
//! - `email_verifications` - One-shot sign-in keys
//! - `tower_sessions.session` - Session storage (tower-sessions)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p ideabox-cli -- migrate
//! ```
//!
//! Handlers talk to the [`Store`] trait object held by the application
//! state; [`PgStore`] backs production and [`MemoryStore`] backs tests and
//! local development without a database.

mod memory;
mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use ideabox_core::{
    Email, IdeaId, IdeaNumber, IdeaStatus, NewComment, NewIdea, NewTag, Role, Slug, TagId, UserId,
};

use crate::models::{Comment, Idea, Tag, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate idea number or tag slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Idea persistence.
#[async_trait]
pub trait IdeaStore: Send + Sync {
    /// Store a validated idea, assigning it the next board number.
    async fn add_idea(&self, user_id: UserId, idea: &NewIdea) -> Result<Idea, RepositoryError>;

    /// Look up an idea by its public number.
    async fn get_idea_by_number(
        &self,
        number: IdeaNumber,
    ) -> Result<Option<Idea>, RepositoryError>;

    /// Most recent ideas first.
    async fn recent_ideas(&self, limit: u32) -> Result<Vec<Idea>, RepositoryError>;

    /// Replace an idea's title and description; the slug follows the title.
    ///
    /// Returns `NotFound` when no idea has `number`.
    async fn update_idea(
        &self,
        number: IdeaNumber,
        idea: &NewIdea,
    ) -> Result<Idea, RepositoryError>;

    /// Record a response, replacing any earlier one, and move the idea to
    /// `status`.
    async fn set_response(
        &self,
        number: IdeaNumber,
        user_id: UserId,
        status: IdeaStatus,
        text: &str,
    ) -> Result<Idea, RepositoryError>;

    /// Add a comment to the idea with `number`.
    async fn add_comment(
        &self,
        number: IdeaNumber,
        user_id: UserId,
        comment: &NewComment,
    ) -> Result<Comment, RepositoryError>;

    /// Comments on an idea, oldest first.
    async fn comments_for(&self, idea_id: IdeaId) -> Result<Vec<Comment>, RepositoryError>;
}

/// Tag persistence and assignment.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Store a validated tag; `Conflict` if its slug is taken.
    async fn add_tag(&self, tag: &NewTag) -> Result<Tag, RepositoryError>;

    /// Rename, recolor, or change the visibility of a tag.
    async fn update_tag(&self, id: TagId, tag: &NewTag) -> Result<Tag, RepositoryError>;

    /// Delete a tag together with its assignments.
    async fn remove_tag(&self, id: TagId) -> Result<(), RepositoryError>;

    async fn get_tag_by_slug(&self, slug: &Slug) -> Result<Option<Tag>, RepositoryError>;

    /// Every tag, by name.
    async fn all_tags(&self) -> Result<Vec<Tag>, RepositoryError>;

    /// Attach a tag to an idea. Assigning twice is a no-op.
    async fn assign_tag(
        &self,
        tag_id: TagId,
        idea_id: IdeaId,
        user_id: UserId,
    ) -> Result<(), RepositoryError>;

    /// Detach a tag from an idea. Unassigning a missing pair is a no-op.
    async fn unassign_tag(&self, tag_id: TagId, idea_id: IdeaId) -> Result<(), RepositoryError>;

    /// Tags on an idea, by name.
    async fn assigned_tags(&self, idea_id: IdeaId) -> Result<Vec<Tag>, RepositoryError>;
}

/// User and sign-in key persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Remember a sign-in key for `email` until `expires_at`.
    async fn save_verification(
        &self,
        email: &Email,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Consume a sign-in key.
    ///
    /// Returns the email it was issued for, or `None` when the key is
    /// unknown, expired at `now`, or already used.
    async fn take_verification(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Email>, RepositoryError>;

    /// Find the user with `email`, creating them with `name` if needed.
    ///
    /// The first user created on an empty board is an administrator; later
    /// ones are visitors.
    async fn get_or_create_user(&self, email: &Email, name: &str)
    -> Result<User, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Change a member's role; `NotFound` for an unknown id.
    async fn set_user_role(&self, id: UserId, role: Role) -> Result<User, RepositoryError>;
}

/// Everything the web handlers need from storage.
pub trait Store: IdeaStore + UserStore + TagStore {}

impl<T: IdeaStore + UserStore + TagStore> Store for T {}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
