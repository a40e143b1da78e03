//! Passwordless sign-in by email link.
//!
//! A sign-in request stores a random one-shot key and mails a link
//! `{base_url}/signin/verify?k={key}`. Following the link consumes the key,
//! creates the user on first visit, and yields the identity to put in the
//! session.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::instrument;

use ideabox_core::{Email, EmailError};

use super::email::{Mailer, MailerError, sign_in_email};
use crate::db::{RepositoryError, Store};
use crate::models::User;
use crate::models::user::default_name;

/// Length of generated sign-in keys.
const KEY_LENGTH: usize = 32;

/// How long a sign-in link stays valid.
const KEY_TTL_HOURS: i64 = 24;

/// Errors from the sign-in flow.
#[derive(Debug, Error)]
pub enum SignInError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("sign-in key is invalid, used, or expired")]
    InvalidKey,

    #[error("mail delivery failed: {0}")]
    Mail(#[from] MailerError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Issues and redeems sign-in links.
#[derive(Clone)]
pub struct SignInService {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    base_url: String,
}

impl SignInService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, base_url: &str) -> Self {
        Self {
            store,
            mailer,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Email a fresh sign-in link to `email`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail` for a malformed address, or the storage or mail
    /// error that prevented the link from going out.
    #[instrument(skip(self))]
    pub async fn request(&self, email: &str) -> Result<(), SignInError> {
        let email = Email::parse(email)?;
        let key = generate_key();
        let expires_at = Utc::now() + Duration::hours(KEY_TTL_HOURS);

        self.store
            .save_verification(&email, &key, expires_at)
            .await?;

        let link = self.link_for(&key);
        self.mailer.send(sign_in_email(&email, &link)?).await?;

        tracing::info!(email = %email, "Sign-in link issued");
        Ok(())
    }

    /// Redeem a sign-in key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` when the key is unknown, expired, or already used.
    #[instrument(skip(self, key))]
    pub async fn verify(&self, key: &str) -> Result<User, SignInError> {
        let email = self
            .store
            .take_verification(key, Utc::now())
            .await?
            .ok_or(SignInError::InvalidKey)?;

        let user = self
            .store
            .get_or_create_user(&email, &default_name(&email))
            .await?;

        tracing::info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// Public URL that redeems `key`.
    #[must_use]
    pub fn link_for(&self, key: &str) -> String {
        format!("{}/signin/verify?k={key}", self.base_url)
    }
}

/// Generate a random alphanumeric sign-in key.
#[must_use]
pub fn generate_key() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(KEY_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::db::MemoryStore;
    use crate::services::email::OutgoingEmail;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<OutgoingEmail>>);

    #[async_trait]
    impl Mailer for Outbox {
        async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError> {
            self.0.lock().await.push(email);
            Ok(())
        }
    }

    fn service() -> (SignInService, Arc<Outbox>) {
        let outbox = Arc::new(Outbox::default());
        let service = SignInService::new(
            Arc::new(MemoryStore::new()),
            outbox.clone(),
            "http://localhost:3000/",
        );
        (service, outbox)
    }

    fn key_from(email: &OutgoingEmail) -> String {
        let (_, key) = email.text.split_once("?k=").unwrap();
        key.chars().take_while(char::is_ascii_alphanumeric).collect()
    }

    #[test]
    fn test_generate_key_format() {
        let key = generate_key();
        assert_eq!(key.len(), KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(key, generate_key());
    }

    #[tokio::test]
    async fn test_request_then_verify() {
        let (service, outbox) = service();
        service.request(" Ana@Example.com ").await.unwrap();

        let sent = outbox.0.lock().await.clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.as_str(), "ana@example.com");
        assert!(
            sent[0]
                .html
                .contains("http://localhost:3000/signin/verify?k=")
        );

        let user = service.verify(&key_from(&sent[0])).await.unwrap();
        assert_eq!(user.email.as_str(), "ana@example.com");
        assert_eq!(user.name, "ana");
    }

    #[tokio::test]
    async fn test_key_is_single_use() {
        let (service, outbox) = service();
        service.request("bo@example.com").await.unwrap();
        let key = key_from(&outbox.0.lock().await[0]);

        assert!(service.verify(&key).await.is_ok());
        assert!(matches!(
            service.verify(&key).await,
            Err(SignInError::InvalidKey)
        ));
    }

    #[tokio::test]
    async fn test_invalid_email_sends_nothing() {
        let (service, outbox) = service();
        assert!(matches!(
            service.request("not-an-email").await,
            Err(SignInError::InvalidEmail(_))
        ));
        assert!(outbox.0.lock().await.is_empty());
    }
}
