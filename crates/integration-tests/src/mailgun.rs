//! Mailgun email link fetcher.
//!
//! Finds the latest email Mailgun accepted for a recipient and returns the
//! first link in its HTML body. Delivery is asynchronous, so the events API
//! is polled up to [`MAX_ATTEMPTS`] times with a delay between attempts.
//!
//! # Environment Variables
//!
//! - `MAILGUN_API` - Mailgun API key
//! - `MAILGUN_DOMAIN` - Sending domain
//! - `MAILGUN_API_BASE` - API root (default: `https://api.mailgun.net`)

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

/// Polls of the events API before giving up.
pub const MAX_ATTEMPTS: u32 = 3;

/// Default wait between polls.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(2);

const DEFAULT_API_BASE: &str = "https://api.mailgun.net";

/// Mailgun basic-auth user name.
const API_USER: &str = "api";

/// First lower-case `<a>` with a quoted `href`; group 1 is double-quoted,
/// group 2 single.
static ANCHOR_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\s+(?:[^>]*?\s+)?href=(?:"([^"]*)"|'([^']*)')"#).expect("Invalid regex")
});

/// Errors from the link fetcher.
#[derive(Debug, Error)]
pub enum MailgunError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// HTTP request failed or Mailgun answered with an error status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Message not found for {0}.")]
    MessageNotFound(String),
}

/// Mailgun credentials and endpoint.
#[derive(Clone)]
pub struct MailgunConfig {
    pub api_key: SecretString,
    pub domain: String,
    /// API root without trailing slash.
    pub api_base: String,
}

impl std::fmt::Debug for MailgunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunConfig")
            .field("api_key", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl MailgunConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, domain: &str, api_base: &str) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            domain: domain.to_owned(),
            api_base: api_base.trim_end_matches('/').to_owned(),
        }
    }

    /// Load configuration from environment variables (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns `MissingEnvVar` if the key or domain is not set.
    pub fn from_env() -> Result<Self, MailgunError> {
        let _ = dotenvy::dotenv();

        let api_key =
            std::env::var("MAILGUN_API").map_err(|_| MailgunError::MissingEnvVar("MAILGUN_API"))?;
        let domain = std::env::var("MAILGUN_DOMAIN")
            .map_err(|_| MailgunError::MissingEnvVar("MAILGUN_DOMAIN"))?;
        let api_base = std::env::var("MAILGUN_API_BASE")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_owned());

        Ok(Self::new(api_key, &domain, &api_base))
    }
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(default)]
    message: EventMessage,
    storage: Option<Storage>,
}

#[derive(Debug, Default, Deserialize)]
struct EventMessage {
    #[serde(default)]
    headers: EventHeaders,
}

#[derive(Debug, Default, Deserialize)]
struct EventHeaders {
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Storage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct StoredMessage {
    #[serde(rename = "body-html", default)]
    body_html: String,
}

/// Client for Mailgun's events and stored-message APIs.
#[derive(Debug, Clone)]
pub struct MailgunClient {
    client: reqwest::Client,
    config: MailgunConfig,
    poll_delay: Duration,
}

impl MailgunClient {
    /// Create a client polling every [`DEFAULT_POLL_DELAY`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: MailgunConfig) -> Result<Self, MailgunError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            poll_delay: DEFAULT_POLL_DELAY,
        })
    }

    #[must_use]
    pub const fn with_poll_delay(mut self, poll_delay: Duration) -> Self {
        self.poll_delay = poll_delay;
        self
    }

    /// First link in the latest email accepted for `to`.
    ///
    /// Returns `""` when the email has no anchor.
    ///
    /// # Errors
    ///
    /// Returns `MessageNotFound` when no event addressed exactly to `to`
    /// shows up within [`MAX_ATTEMPTS`] polls, or `Http` if Mailgun fails.
    #[instrument(skip(self))]
    pub async fn link_from_last_email_to(&self, to: &str) -> Result<String, MailgunError> {
        for attempt in 1..=MAX_ATTEMPTS {
            if let Some(storage_url) = self.latest_message_url(to).await? {
                let html = self.message_html(&storage_url).await?;
                return Ok(extract_first_link(&html));
            }

            tracing::debug!(attempt, "No message yet");
            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(self.poll_delay).await;
            }
        }

        Err(MailgunError::MessageNotFound(to.to_owned()))
    }

    /// Storage URL of the latest accepted message, if it was sent to `to`.
    async fn latest_message_url(&self, to: &str) -> Result<Option<String>, MailgunError> {
        let url = format!("{}/v3/{}/events", self.config.api_base, self.config.domain);

        let events: EventsResponse = self
            .client
            .get(&url)
            .basic_auth(API_USER, Some(self.config.api_key.expose_secret()))
            .query(&[
                ("to", to),
                ("event", "accepted"),
                ("limit", "1"),
                ("ascending", "no"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(events.items.into_iter().next().and_then(|event| {
            if event.message.headers.to.as_deref() == Some(to) {
                event.storage.map(|s| s.url)
            } else {
                None
            }
        }))
    }

    async fn message_html(&self, storage_url: &str) -> Result<String, MailgunError> {
        let message: StoredMessage = self
            .client
            .get(storage_url)
            .basic_auth(API_USER, Some(self.config.api_key.expose_secret()))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(message.body_html)
    }
}

/// The `href` of the first anchor in `html`, or `""` if there is none.
#[must_use]
pub fn extract_first_link(html: &str) -> String {
    ANCHOR_HREF_RE
        .captures(html)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_double_quoted() {
        assert_eq!(
            extract_first_link(r#"<p>Hi</p><a href="https://x">go</a>"#),
            "https://x"
        );
    }

    #[test]
    fn test_extract_single_quoted_with_attributes() {
        let html = r"<a class='btn' target='_blank' href='https://ideas.example.org/signin/verify?k=abc'>";
        assert_eq!(
            extract_first_link(html),
            "https://ideas.example.org/signin/verify?k=abc"
        );
    }

    #[test]
    fn test_extract_first_of_many() {
        let html = r#"<a href="https://one">1</a> <a href="https://two">2</a>"#;
        assert_eq!(extract_first_link(html), "https://one");
    }

    #[test]
    fn test_extract_without_anchor() {
        assert_eq!(extract_first_link("<p>No links here</p>"), "");
        assert_eq!(extract_first_link(r#"<abbr href="https://x">"#), "");
    }

    #[test]
    fn test_extract_is_case_sensitive() {
        assert_eq!(extract_first_link(r#"<A HREF="https://upper">x</A>"#), "");
        assert_eq!(
            extract_first_link(r#"<A HREF="https://upper">x</A><a href="https://lower">y</a>"#),
            "https://lower"
        );
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = MailgunConfig::new("key-123456", "mg.example.org", "https://api.mailgun.net/");
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("key-123456"));
        assert_eq!(config.api_base, "https://api.mailgun.net");
    }
}
