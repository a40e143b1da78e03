//! Session-related types.
//!
//! Types stored in the session for authentication state and draft caching.

use serde::{Deserialize, Serialize};

use ideabox_core::{Email, UserId};

/// Session-stored user identity.
///
/// Its presence decides whether the idea input may take focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Draft title, shared with the widget's client-side cache.
    pub const DRAFT_TITLE: &str = ideabox_core::CACHE_TITLE_KEY;

    /// Draft description, shared with the widget's client-side cache.
    pub const DRAFT_DESCRIPTION: &str = ideabox_core::CACHE_DESCRIPTION_KEY;
}
