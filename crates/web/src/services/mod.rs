//! Business logic services.
//!
//! # Services
//!
//! - `ideas` - Idea creation behind the [`IdeaService`] seam; edits,
//!   comments, and responses
//! - `tags` - Tag management and assignment
//! - `signin` - Passwordless sign-in links
//! - `email` - Outgoing mail (SMTP or log-only)

pub mod email;
pub mod ideas;
pub mod signin;
pub mod tags;

pub use email::{LogMailer, Mailer, SmtpMailer};
pub use ideas::{HttpIdeaService, IdeaService, LocalIdeaService};
pub use signin::SignInService;
pub use tags::TagService;
