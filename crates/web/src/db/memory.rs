//! In-process store for tests and database-less development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use ideabox_core::{
    CommentId, Email, IdeaId, IdeaNumber, IdeaStatus, NewComment, NewIdea, NewTag, Role, Slug,
    TagId, UserId,
};

use super::{IdeaStore, RepositoryError, TagStore, UserStore};
use crate::models::{Comment, Idea, IdeaResponse, Tag, User};

#[derive(Debug)]
struct Verification {
    email: Email,
    expires_at: DateTime<Utc>,
    used: bool,
}

#[derive(Debug)]
struct Assignment {
    tag_id: TagId,
    idea_id: IdeaId,
}

#[derive(Debug, Default)]
struct Inner {
    ideas: Vec<Idea>,
    users: Vec<User>,
    comments: Vec<Comment>,
    tags: Vec<Tag>,
    /// Tag ids keep growing after removals.
    tag_sequence: usize,
    assignments: Vec<Assignment>,
    verifications: HashMap<String, Verification>,
}

impl Inner {
    fn idea_mut(&mut self, number: IdeaNumber) -> Result<&mut Idea, RepositoryError> {
        self.ideas
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or(RepositoryError::NotFound)
    }

    fn user(&self, id: UserId) -> Result<&User, RepositoryError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)
    }

    fn slug_taken(&self, slug: &Slug, except: Option<TagId>) -> bool {
        self.tags
            .iter()
            .any(|t| &t.slug == slug && Some(t.id) != except)
    }
}

/// Store that keeps everything in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(len: usize) -> Result<i32, RepositoryError> {
    i32::try_from(len + 1).map_err(|_| RepositoryError::Conflict("id space exhausted".to_owned()))
}

fn sorted_by_name(mut tags: Vec<Tag>) -> Vec<Tag> {
    tags.sort_by(|a, b| a.name.cmp(&b.name));
    tags
}

#[async_trait]
impl IdeaStore for MemoryStore {
    async fn add_idea(&self, user_id: UserId, idea: &NewIdea) -> Result<Idea, RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner.user(user_id)?;

        let id = next_id(inner.ideas.len())?;
        let number = inner
            .ideas
            .iter()
            .map(|i| i.number)
            .max()
            .map_or(IdeaNumber::FIRST, IdeaNumber::next);

        let stored = Idea {
            id: IdeaId::new(id),
            number,
            title: idea.title.clone(),
            slug: idea.slug(),
            description: idea.description.clone(),
            user_id,
            status: IdeaStatus::New,
            response: None,
            created_at: Utc::now(),
        };
        inner.ideas.push(stored.clone());
        Ok(stored)
    }

    async fn get_idea_by_number(
        &self,
        number: IdeaNumber,
    ) -> Result<Option<Idea>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.ideas.iter().find(|i| i.number == number).cloned())
    }

    async fn recent_ideas(&self, limit: u32) -> Result<Vec<Idea>, RepositoryError> {
        let inner = self.inner.lock().await;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(inner.ideas.iter().rev().take(limit).cloned().collect())
    }

    async fn update_idea(
        &self,
        number: IdeaNumber,
        idea: &NewIdea,
    ) -> Result<Idea, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let stored = inner.idea_mut(number)?;
        stored.title.clone_from(&idea.title);
        stored.slug = idea.slug();
        stored.description.clone_from(&idea.description);
        Ok(stored.clone())
    }

    async fn set_response(
        &self,
        number: IdeaNumber,
        user_id: UserId,
        status: IdeaStatus,
        text: &str,
    ) -> Result<Idea, RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner.user(user_id)?;
        let stored = inner.idea_mut(number)?;
        stored.status = status;
        stored.response = Some(IdeaResponse {
            text: text.to_owned(),
            user_id,
            responded_at: Utc::now(),
        });
        Ok(stored.clone())
    }

    async fn add_comment(
        &self,
        number: IdeaNumber,
        user_id: UserId,
        comment: &NewComment,
    ) -> Result<Comment, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let user_name = inner.user(user_id)?.name.clone();
        let idea_id = inner.idea_mut(number)?.id;

        let stored = Comment {
            id: CommentId::new(next_id(inner.comments.len())?),
            idea_id,
            content: comment.content.clone(),
            user_id,
            user_name,
            created_at: Utc::now(),
        };
        inner.comments.push(stored.clone());
        Ok(stored)
    }

    async fn comments_for(&self, idea_id: IdeaId) -> Result<Vec<Comment>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .comments
            .iter()
            .filter(|c| c.idea_id == idea_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn add_tag(&self, tag: &NewTag) -> Result<Tag, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let slug = tag.slug();
        if inner.slug_taken(&slug, None) {
            return Err(RepositoryError::Conflict(format!("tag slug {slug} taken")));
        }

        let id = TagId::new(next_id(inner.tag_sequence)?);
        inner.tag_sequence += 1;

        let stored = Tag {
            id,
            name: tag.name.clone(),
            slug,
            color: tag.color.clone(),
            is_public: tag.is_public,
        };
        inner.tags.push(stored.clone());
        Ok(stored)
    }

    async fn update_tag(&self, id: TagId, tag: &NewTag) -> Result<Tag, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let slug = tag.slug();
        if inner.slug_taken(&slug, Some(id)) {
            return Err(RepositoryError::Conflict(format!("tag slug {slug} taken")));
        }

        let stored = inner
            .tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(RepositoryError::NotFound)?;
        stored.name.clone_from(&tag.name);
        stored.slug = slug;
        stored.color.clone_from(&tag.color);
        stored.is_public = tag.is_public;
        Ok(stored.clone())
    }

    async fn remove_tag(&self, id: TagId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        let before = inner.tags.len();
        inner.tags.retain(|t| t.id != id);
        if inner.tags.len() == before {
            return Err(RepositoryError::NotFound);
        }
        inner.assignments.retain(|a| a.tag_id != id);
        Ok(())
    }

    async fn get_tag_by_slug(&self, slug: &Slug) -> Result<Option<Tag>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.tags.iter().find(|t| &t.slug == slug).cloned())
    }

    async fn all_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(sorted_by_name(inner.tags.clone()))
    }

    async fn assign_tag(
        &self,
        tag_id: TagId,
        idea_id: IdeaId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner.user(user_id)?;
        if !inner.tags.iter().any(|t| t.id == tag_id)
            || !inner.ideas.iter().any(|i| i.id == idea_id)
        {
            return Err(RepositoryError::NotFound);
        }

        let assigned = inner
            .assignments
            .iter()
            .any(|a| a.tag_id == tag_id && a.idea_id == idea_id);
        if !assigned {
            inner.assignments.push(Assignment { tag_id, idea_id });
        }
        Ok(())
    }

    async fn unassign_tag(&self, tag_id: TagId, idea_id: IdeaId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner
            .assignments
            .retain(|a| !(a.tag_id == tag_id && a.idea_id == idea_id));
        Ok(())
    }

    async fn assigned_tags(&self, idea_id: IdeaId) -> Result<Vec<Tag>, RepositoryError> {
        let inner = self.inner.lock().await;
        let tags = inner
            .tags
            .iter()
            .filter(|t| {
                inner
                    .assignments
                    .iter()
                    .any(|a| a.tag_id == t.id && a.idea_id == idea_id)
            })
            .cloned()
            .collect();
        Ok(sorted_by_name(tags))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn save_verification(
        &self,
        email: &Email,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        if inner.verifications.contains_key(key) {
            return Err(RepositoryError::Conflict("verification key reused".to_owned()));
        }
        inner.verifications.insert(
            key.to_owned(),
            Verification {
                email: email.clone(),
                expires_at,
                used: false,
            },
        );
        Ok(())
    }

    async fn take_verification(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Email>, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let Some(verification) = inner.verifications.get_mut(key) else {
            return Ok(None);
        };
        if verification.used || verification.expires_at <= now {
            return Ok(None);
        }
        verification.used = true;
        Ok(Some(verification.email.clone()))
    }

    async fn get_or_create_user(
        &self,
        email: &Email,
        name: &str,
    ) -> Result<User, RepositoryError> {
        let mut inner = self.inner.lock().await;
        if let Some(user) = inner.users.iter().find(|u| &u.email == email) {
            return Ok(user.clone());
        }

        let role = if inner.users.is_empty() {
            Role::Administrator
        } else {
            Role::Visitor
        };
        let user = User {
            id: UserId::new(next_id(inner.users.len())?),
            name: name.to_owned(),
            email: email.clone(),
            role,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<User, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        user.role = role;
        Ok(user.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    async fn store_with_idea() -> (MemoryStore, User, Idea) {
        let store = MemoryStore::new();
        let user = store
            .get_or_create_user(&email("ana@example.com"), "ana")
            .await
            .unwrap();
        let idea = store
            .add_idea(
                user.id,
                &NewIdea::new("My great idea", "with a great description"),
            )
            .await
            .unwrap();
        (store, user, idea)
    }

    #[tokio::test]
    async fn test_numbers_are_sequential() {
        let store = MemoryStore::new();
        let user = store
            .get_or_create_user(&email("ana@example.com"), "ana")
            .await
            .unwrap();

        let first = store
            .add_idea(user.id, &NewIdea::new("Add a dark mode", ""))
            .await
            .unwrap();
        let second = store
            .add_idea(user.id, &NewIdea::new("Export ideas to CSV", "please"))
            .await
            .unwrap();

        assert_eq!(first.number, IdeaNumber::new(1));
        assert_eq!(second.number, IdeaNumber::new(2));
        assert_eq!(second.slug.as_str(), "export-ideas-to-csv");
        assert_eq!(second.status, IdeaStatus::New);

        let recent = store.recent_ideas(1).await.unwrap();
        assert_eq!(recent, vec![second.clone()]);
        assert_eq!(
            store.get_idea_by_number(second.number).await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_add_idea_requires_known_user() {
        let store = MemoryStore::new();
        let result = store
            .add_idea(UserId::new(9), &NewIdea::new("Add a dark mode", ""))
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_idea_moves_slug() {
        let (store, _, idea) = store_with_idea().await;

        let updated = store
            .update_idea(idea.number, &NewIdea::new("My even better idea", "new text"))
            .await
            .unwrap();
        assert_eq!(updated.id, idea.id);
        assert_eq!(updated.slug.as_str(), "my-even-better-idea");
        assert_eq!(updated.description, "new text");

        let missing = store
            .update_idea(IdeaNumber::new(99), &NewIdea::new("Anything at all here", ""))
            .await;
        assert!(matches!(missing, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_set_response() {
        let (store, user, idea) = store_with_idea().await;

        let answered = store
            .set_response(idea.number, user.id, IdeaStatus::Started, "Working on it")
            .await
            .unwrap();
        assert_eq!(answered.status, IdeaStatus::Started);
        let response = answered.response.unwrap();
        assert_eq!(response.text, "Working on it");
        assert_eq!(response.user_id, user.id);
    }

    #[tokio::test]
    async fn test_comments_keep_order_and_author() {
        let (store, user, idea) = store_with_idea().await;

        store
            .add_comment(idea.number, user.id, &NewComment::new("First"))
            .await
            .unwrap();
        store
            .add_comment(idea.number, user.id, &NewComment::new("Second"))
            .await
            .unwrap();

        let comments = store.comments_for(idea.id).await.unwrap();
        let contents: Vec<_> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["First", "Second"]);
        assert_eq!(comments[0].user_name, "ana");
    }

    #[tokio::test]
    async fn test_tag_add_and_get() {
        let store = MemoryStore::new();
        let tag = store
            .add_tag(&NewTag::new("Feature Request", "FF0000", true))
            .await
            .unwrap();
        assert_eq!(tag.id, TagId::new(1));

        let stored = store
            .get_tag_by_slug(&Slug::from_title("feature-request"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, tag.id);
        assert_eq!(stored.name, "Feature Request");
        assert_eq!(stored.slug.as_str(), "feature-request");
        assert_eq!(stored.color, "FF0000");
        assert!(stored.is_public);
    }

    #[tokio::test]
    async fn test_tag_add_update_and_get() {
        let store = MemoryStore::new();
        let tag = store
            .add_tag(&NewTag::new("Feature Request", "FF0000", true))
            .await
            .unwrap();
        let updated = store
            .update_tag(tag.id, &NewTag::new("Bug", "000000", false))
            .await
            .unwrap();

        let stored = store
            .get_tag_by_slug(&Slug::from_title("bug"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.id, tag.id);
        assert_eq!(stored.color, "000000");
        assert!(!stored.is_public);
        assert_eq!(
            store
                .get_tag_by_slug(&Slug::from_title("feature-request"))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_tag_slug_must_be_unique() {
        let store = MemoryStore::new();
        store
            .add_tag(&NewTag::new("Bug", "FFFFFF", true))
            .await
            .unwrap();
        let other = store
            .add_tag(&NewTag::new("Feature", "FFFFFF", true))
            .await
            .unwrap();

        assert!(matches!(
            store.add_tag(&NewTag::new("BUG", "000000", true)).await,
            Err(RepositoryError::Conflict(_))
        ));
        assert!(matches!(
            store
                .update_tag(other.id, &NewTag::new("bug", "000000", true))
                .await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_tag_add_remove_and_get() {
        let store = MemoryStore::new();
        let tag = store
            .add_tag(&NewTag::new("Bug", "FFFFFF", true))
            .await
            .unwrap();

        store.remove_tag(tag.id).await.unwrap();

        assert_eq!(
            store
                .get_tag_by_slug(&Slug::from_title("bug"))
                .await
                .unwrap(),
            None
        );
        assert!(matches!(
            store.remove_tag(tag.id).await,
            Err(RepositoryError::NotFound)
        ));

        let next = store
            .add_tag(&NewTag::new("Bug", "FFFFFF", true))
            .await
            .unwrap();
        assert_ne!(next.id, tag.id);
    }

    #[tokio::test]
    async fn test_tag_assign_unassign() {
        let (store, user, idea) = store_with_idea().await;
        let tag = store
            .add_tag(&NewTag::new("Bug", "FFFFFF", true))
            .await
            .unwrap();

        store.assign_tag(tag.id, idea.id, user.id).await.unwrap();
        store.assign_tag(tag.id, idea.id, user.id).await.unwrap();

        let assigned = store.assigned_tags(idea.id).await.unwrap();
        assert_eq!(assigned, vec![tag.clone()]);

        store.unassign_tag(tag.id, idea.id).await.unwrap();
        assert!(store.assigned_tags(idea.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tag_assign_then_remove_tag() {
        let (store, user, idea) = store_with_idea().await;
        let tag = store
            .add_tag(&NewTag::new("Bug", "FFFFFF", true))
            .await
            .unwrap();

        store.assign_tag(tag.id, idea.id, user.id).await.unwrap();
        store.remove_tag(tag.id).await.unwrap();

        assert!(store.assigned_tags(idea.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_user_is_administrator() {
        let store = MemoryStore::new();
        let first = store
            .get_or_create_user(&email("ana@example.com"), "ana")
            .await
            .unwrap();
        let second = store
            .get_or_create_user(&email("bo@example.com"), "bo")
            .await
            .unwrap();
        assert_eq!(first.role, Role::Administrator);
        assert_eq!(second.role, Role::Visitor);

        let promoted = store
            .set_user_role(second.id, Role::Collaborator)
            .await
            .unwrap();
        assert_eq!(promoted.role, Role::Collaborator);
        assert_eq!(store.get_user(second.id).await.unwrap(), Some(promoted));
        assert!(matches!(
            store.set_user_role(UserId::new(9), Role::Visitor).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_or_create_user_is_idempotent() {
        let store = MemoryStore::new();
        let a = store
            .get_or_create_user(&email("bo@example.com"), "bo")
            .await
            .unwrap();
        let b = store
            .get_or_create_user(&email("BO@example.com"), "someone else")
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_verification_is_single_use() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .save_verification(&email("cy@example.com"), "k1", now + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(
            store.take_verification("k1", now).await.unwrap(),
            Some(email("cy@example.com"))
        );
        assert_eq!(store.take_verification("k1", now).await.unwrap(), None);
        assert_eq!(store.take_verification("missing", now).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_verification_expires() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .save_verification(&email("di@example.com"), "k2", now)
            .await
            .unwrap();
        assert_eq!(store.take_verification("k2", now).await.unwrap(), None);
    }
}
