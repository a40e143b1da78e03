//! Outgoing email.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. When SMTP
//! is not configured, [`LogMailer`] writes the message to the log instead so
//! sign-in links are still reachable during local development.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use ideabox_core::Email;

use crate::config::SmtpConfig;

/// HTML body of the sign-in email.
#[derive(Template)]
#[template(path = "email/signin.html")]
pub struct SignInEmailHtml<'a> {
    pub link: &'a str,
}

/// Plain text body of the sign-in email.
#[derive(Template)]
#[template(path = "email/signin.txt")]
pub struct SignInEmailText<'a> {
    pub link: &'a str,
}

/// A rendered message ready to hand to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Email,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Something that delivers email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError>;
}

/// Mailer that relays through an SMTP server.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Build a STARTTLS relay from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured.
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_owned(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailerError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .as_str()
                .parse()
                .map_err(|_| MailerError::InvalidAddress(email.to.to_string()))?)
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html),
                    ),
            )?;

        self.transport.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Mailer that only logs; used when SMTP is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError> {
        tracing::warn!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text,
            "SMTP not configured, email not sent"
        );
        Ok(())
    }
}

/// Render the sign-in email for `to` pointing at `link`.
///
/// # Errors
///
/// Returns error if a template fails to render.
pub fn sign_in_email(to: &Email, link: &str) -> Result<OutgoingEmail, MailerError> {
    Ok(OutgoingEmail {
        to: to.clone(),
        subject: "Sign in to Ideabox".to_owned(),
        text: SignInEmailText { link }.render()?,
        html: SignInEmailHtml { link }.render()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_email_contains_link() {
        let to = Email::parse("ana@example.com").unwrap();
        let email = sign_in_email(&to, "https://ideas.example.org/signin/verify?k=abc").unwrap();

        assert_eq!(email.to, to);
        assert!(
            email
                .html
                .contains(r#"href="https://ideas.example.org/signin/verify?k=abc""#)
        );
        assert!(
            email
                .text
                .contains("https://ideas.example.org/signin/verify?k=abc")
        );
    }
}
