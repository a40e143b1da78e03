//! Integration tests and test helpers for Ideabox.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ideabox-integration-tests
//! ```
//!
//! The tests start the board in-process on an ephemeral port and stand in
//! for Mailgun with a local axum server, so no external service is needed.
//!
//! # Helpers
//!
//! - [`mailgun`] - fetch the first link of the latest email sent to an address
//!   (used by end-to-end sign-in flows and by `ideabox mail last-link`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod mailgun;
