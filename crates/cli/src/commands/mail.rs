//! Mail inspection commands.
//!
//! # Environment Variables
//!
//! - `MAILGUN_API` - Mailgun API key
//! - `MAILGUN_DOMAIN` - Sending domain
//! - `MAILGUN_API_BASE` - API root (default: `https://api.mailgun.net`)

use std::time::Duration;

use ideabox_integration_tests::mailgun::{MailgunClient, MailgunConfig};

/// Print the first link in the latest email accepted for `to`.
///
/// # Errors
///
/// Returns error if Mailgun is not configured or no message for `to` turns
/// up within the poll budget.
pub async fn last_link(to: &str, poll_delay_secs: u64) -> Result<(), Box<dyn std::error::Error>> {
    let config = MailgunConfig::from_env()?;
    let client = MailgunClient::new(config)?.with_poll_delay(Duration::from_secs(poll_delay_secs));

    let link = client.link_from_last_email_to(to).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{link}");
    }
    Ok(())
}
