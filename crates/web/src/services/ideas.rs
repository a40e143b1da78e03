//! Idea creation, as seen by the idea input widget, and the follow-up
//! operations on an existing idea.
//!
//! [`IdeaService`] is the seam between the widget and whatever actually
//! stores the idea: [`HttpIdeaService`] talks to a running board over HTTP,
//! [`LocalIdeaService`] validates and stores in-process. Role checks happen
//! in the handlers before these run.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use ideabox_core::{Failure, IdeaCreated, IdeaNumber, NewComment, NewIdea, NewResponse, UserId};

use crate::db::{IdeaStore, RepositoryError, Store};
use crate::models::{Comment, Idea};

/// Remote operation that creates an idea.
#[async_trait]
pub trait IdeaService: Send + Sync {
    /// Create an idea from the given title and description.
    ///
    /// # Errors
    ///
    /// Returns the [`Failure`] to display on the form.
    async fn add_idea(&self, title: &str, description: &str) -> Result<IdeaCreated, Failure>;
}

#[async_trait]
impl<T: IdeaService + ?Sized> IdeaService for Arc<T> {
    async fn add_idea(&self, title: &str, description: &str) -> Result<IdeaCreated, Failure> {
        (**self).add_idea(title, description).await
    }
}

#[derive(Serialize)]
struct AddIdeaRequest<'a> {
    title: &'a str,
    description: &'a str,
}

/// Idea service that posts to `/api/ideas` on a running board.
///
/// The client must carry the session cookie of a signed-in user; build it
/// with `cookie_store(true)` and share it with the sign-in requests.
#[derive(Debug, Clone)]
pub struct HttpIdeaService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdeaService {
    /// Create a service with its own cookie-keeping client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a service over an existing client (and its cookies).
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl IdeaService for HttpIdeaService {
    #[instrument(skip(self, description), fields(base_url = %self.base_url))]
    async fn add_idea(&self, title: &str, description: &str) -> Result<IdeaCreated, Failure> {
        let url = format!("{}/api/ideas", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AddIdeaRequest { title, description })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Idea request failed");
                Failure::message("Could not reach the server. Please try again.")
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<IdeaCreated>().await.map_err(|e| {
                tracing::warn!(error = %e, "Unexpected idea response");
                Failure::message("Unexpected response from the server.")
            });
        }

        match response.json::<Failure>().await {
            Ok(failure) if !failure.is_empty() => Err(failure),
            _ if status == StatusCode::UNAUTHORIZED => {
                Err(Failure::message("Please sign in to continue."))
            }
            _ => Err(Failure::message(format!(
                "The server rejected the idea ({status})."
            ))),
        }
    }
}

/// Why an in-process idea operation did not go through.
#[derive(Debug, Error)]
pub enum IdeaError {
    #[error("invalid input: {0}")]
    Invalid(Failure),

    #[error("idea {0} not found")]
    NotFound(IdeaNumber),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl IdeaError {
    /// `NotFound` from storage names the idea; anything else passes through.
    fn for_idea(number: IdeaNumber) -> impl FnOnce(RepositoryError) -> Self {
        move |e| match e {
            RepositoryError::NotFound => Self::NotFound(number),
            other => Self::Repository(other),
        }
    }
}

/// Idea service that validates and stores ideas directly.
#[derive(Clone)]
pub struct LocalIdeaService {
    store: Arc<dyn Store>,
    user_id: UserId,
}

impl LocalIdeaService {
    /// Create a service that submits on behalf of `user_id`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, user_id: UserId) -> Self {
        Self { store, user_id }
    }

    /// Validate and store an idea.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` with the field failures, or `Repository` when the
    /// idea could not be stored.
    pub async fn create(&self, title: &str, description: &str) -> Result<Idea, IdeaError> {
        let idea = NewIdea::new(title, description);
        idea.validate().map_err(IdeaError::Invalid)?;

        let stored = IdeaStore::add_idea(&*self.store, self.user_id, &idea).await?;

        tracing::info!(number = %stored.number, user_id = %self.user_id, "Idea created");
        Ok(stored)
    }

    /// Edit an idea's title and description under the same title rules as
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` first, then `NotFound` if no idea has `number`.
    pub async fn update(
        &self,
        number: IdeaNumber,
        title: &str,
        description: &str,
    ) -> Result<Idea, IdeaError> {
        let idea = NewIdea::new(title, description);
        idea.validate().map_err(IdeaError::Invalid)?;

        let stored = self
            .store
            .update_idea(number, &idea)
            .await
            .map_err(IdeaError::for_idea(number))?;

        tracing::info!(number = %number, user_id = %self.user_id, "Idea updated");
        Ok(stored)
    }

    /// Comment on an idea.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a blank comment or `NotFound` for an unknown
    /// idea.
    pub async fn comment(&self, number: IdeaNumber, content: &str) -> Result<Comment, IdeaError> {
        let comment = NewComment::new(content);
        comment.validate().map_err(IdeaError::Invalid)?;

        self.store
            .add_comment(number, self.user_id, &comment)
            .await
            .map_err(IdeaError::for_idea(number))
    }

    /// Set an idea's status with an explanation.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for an out-of-range status or blank text, or
    /// `NotFound` for an unknown idea.
    pub async fn respond(
        &self,
        number: IdeaNumber,
        response: &NewResponse,
    ) -> Result<Idea, IdeaError> {
        let status = response.validate().map_err(IdeaError::Invalid)?;

        let stored = self
            .store
            .set_response(number, self.user_id, status, response.text.trim())
            .await
            .map_err(IdeaError::for_idea(number))?;

        tracing::info!(number = %number, status = %status, "Idea status changed");
        Ok(stored)
    }
}

#[async_trait]
impl IdeaService for LocalIdeaService {
    async fn add_idea(&self, title: &str, description: &str) -> Result<IdeaCreated, Failure> {
        match self.create(title, description).await {
            Ok(idea) => Ok(idea.created()),
            Err(IdeaError::Invalid(failure)) => Err(failure),
            Err(e) => {
                tracing::error!(error = %e, "Failed to store idea");
                Err(Failure::message("Something went wrong. Please try again."))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ideabox_core::{Email, IdeaNumber};

    use super::*;
    use crate::db::{MemoryStore, UserStore};

    async fn local_service() -> LocalIdeaService {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .get_or_create_user(&Email::parse("ana@example.com").unwrap(), "ana")
            .await
            .unwrap();
        LocalIdeaService::new(store, user.id)
    }

    #[tokio::test]
    async fn test_update_checks_title_before_number() {
        let service = local_service().await;

        let invalid = service.update(IdeaNumber::new(5), "Dark", "").await;
        assert!(matches!(invalid, Err(IdeaError::Invalid(_))));

        let missing = service
            .update(IdeaNumber::new(5), "Add a dark mode", "")
            .await;
        assert!(matches!(missing, Err(IdeaError::NotFound(n)) if n == IdeaNumber::new(5)));

        service.create("Add a dark mode", "").await.unwrap();
        let updated = service
            .update(IdeaNumber::FIRST, "Add a light mode too", "Both themes")
            .await
            .unwrap();
        assert_eq!(updated.slug.as_str(), "add-a-light-mode-too");
    }

    #[tokio::test]
    async fn test_comment_rules() {
        let service = local_service().await;
        service.create("Add a dark mode", "").await.unwrap();

        let Err(IdeaError::Invalid(failure)) = service.comment(IdeaNumber::FIRST, " ").await else {
            panic!("blank comment accepted");
        };
        assert_eq!(
            failure.for_field("content"),
            ["Comment is required.".to_owned()]
        );

        let comment = service
            .comment(IdeaNumber::FIRST, "Yes please")
            .await
            .unwrap();
        assert_eq!(comment.user_name, "ana");
        assert!(matches!(
            service.comment(IdeaNumber::new(2), "Hello").await,
            Err(IdeaError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_respond() {
        let service = local_service().await;
        service.create("Add a dark mode", "").await.unwrap();

        let idea = service
            .respond(
                IdeaNumber::FIRST,
                &NewResponse {
                    status: 2,
                    text: " Shipped in 1.2 ".to_owned(),
                },
            )
            .await
            .unwrap();
        assert_eq!(idea.status, ideabox_core::IdeaStatus::Completed);
        assert_eq!(idea.response.unwrap().text, "Shipped in 1.2");

        let invalid = service
            .respond(
                IdeaNumber::FIRST,
                &NewResponse {
                    status: 9,
                    text: String::new(),
                },
            )
            .await;
        assert!(matches!(invalid, Err(IdeaError::Invalid(f)) if f.failures.len() == 2));
    }

    #[tokio::test]
    async fn test_local_add_idea() {
        let service = local_service().await;
        let created = service
            .add_idea("Add a dark mode", "Easier on the eyes")
            .await
            .unwrap();
        assert_eq!(created.number, IdeaNumber::FIRST);
        assert_eq!(created.redirect_path(), "/ideas/1/add-a-dark-mode");
    }

    #[tokio::test]
    async fn test_local_add_idea_validation() {
        let service = local_service().await;
        let failure = service.add_idea("Dark", "").await.unwrap_err();
        assert_eq!(
            failure.for_field("title"),
            ["Title needs to be more descriptive.".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_http_unreachable_is_a_failure() {
        let service = HttpIdeaService::new("http://127.0.0.1:9").unwrap();
        let failure = service.add_idea("Add a dark mode", "").await.unwrap_err();
        assert!(!failure.messages.is_empty());
    }
}
