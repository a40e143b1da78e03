//! Tag management and assignment.
//!
//! Tags are addressed by slug in URLs. Administrators create, edit, and
//! remove them; collaborators assign them to ideas.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use ideabox_core::{Failure, IdeaNumber, NewTag, Role, Slug, UserId};

use crate::db::{RepositoryError, Store};
use crate::models::{Idea, Tag};

/// Why a tag operation did not go through.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("invalid tag: {0}")]
    Invalid(Failure),

    #[error("tag {0} not found")]
    TagNotFound(String),

    #[error("idea {0} not found")]
    IdeaNotFound(IdeaNumber),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Tag operations over the board's store.
#[derive(Clone)]
pub struct TagService {
    store: Arc<dyn Store>,
}

fn name_in_use(e: RepositoryError) -> TagError {
    match e {
        RepositoryError::Conflict(_) => {
            TagError::Invalid(Failure::field("name", "This tag name is already in use."))
        }
        other => TagError::Repository(other),
    }
}

impl TagService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Tags a viewer with `role` may see: all of them for collaborators,
    /// public ones otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if the tags cannot be read.
    pub async fn list(&self, role: Option<Role>) -> Result<Vec<Tag>, TagError> {
        let tags = self.store.all_tags().await?;
        Ok(visible(tags, role))
    }

    /// # Errors
    ///
    /// Returns `Invalid` for a bad name or color, or a name whose slug is
    /// already taken.
    #[instrument(skip(self))]
    pub async fn create(&self, tag: &NewTag) -> Result<Tag, TagError> {
        tag.validate().map_err(TagError::Invalid)?;
        let stored = self.store.add_tag(tag).await.map_err(name_in_use)?;

        tracing::info!(slug = %stored.slug, "Tag created");
        Ok(stored)
    }

    /// Edit the tag currently at `slug`; its slug follows the new name.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` as for [`create`](Self::create), or `TagNotFound`.
    #[instrument(skip(self))]
    pub async fn update(&self, slug: &str, tag: &NewTag) -> Result<Tag, TagError> {
        tag.validate().map_err(TagError::Invalid)?;
        let existing = self.find(slug).await?;
        let stored = self
            .store
            .update_tag(existing.id, tag)
            .await
            .map_err(name_in_use)?;

        tracing::info!(from = %slug, to = %stored.slug, "Tag updated");
        Ok(stored)
    }

    /// Delete a tag and unassign it everywhere.
    ///
    /// # Errors
    ///
    /// Returns `TagNotFound` for an unknown slug.
    #[instrument(skip(self))]
    pub async fn remove(&self, slug: &str) -> Result<(), TagError> {
        let existing = self.find(slug).await?;
        self.store.remove_tag(existing.id).await?;

        tracing::info!(slug = %slug, "Tag removed");
        Ok(())
    }

    /// Attach the tag at `slug` to idea `number`, on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `TagNotFound` or `IdeaNotFound`.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        slug: &str,
        number: IdeaNumber,
        user_id: UserId,
    ) -> Result<(), TagError> {
        let tag = self.find(slug).await?;
        let idea = self.idea(number).await?;
        self.store.assign_tag(tag.id, idea.id, user_id).await?;
        Ok(())
    }

    /// Detach the tag at `slug` from idea `number`.
    ///
    /// # Errors
    ///
    /// Returns `TagNotFound` or `IdeaNotFound`.
    #[instrument(skip(self))]
    pub async fn unassign(&self, slug: &str, number: IdeaNumber) -> Result<(), TagError> {
        let tag = self.find(slug).await?;
        let idea = self.idea(number).await?;
        self.store.unassign_tag(tag.id, idea.id).await?;
        Ok(())
    }

    /// Tags on `idea` that a viewer with `role` may see.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if the assignments cannot be read.
    pub async fn for_idea(&self, idea: &Idea, role: Option<Role>) -> Result<Vec<Tag>, TagError> {
        let tags = self.store.assigned_tags(idea.id).await?;
        Ok(visible(tags, role))
    }

    async fn find(&self, slug: &str) -> Result<Tag, TagError> {
        self.store
            .get_tag_by_slug(&Slug::from_stored(slug.to_owned()))
            .await?
            .ok_or_else(|| TagError::TagNotFound(slug.to_owned()))
    }

    async fn idea(&self, number: IdeaNumber) -> Result<Idea, TagError> {
        self.store
            .get_idea_by_number(number)
            .await?
            .ok_or(TagError::IdeaNotFound(number))
    }
}

fn visible(tags: Vec<Tag>, role: Option<Role>) -> Vec<Tag> {
    if role.is_some_and(|r| r >= Role::Collaborator) {
        tags
    } else {
        tags.into_iter().filter(|t| t.is_public).collect()
    }
}
