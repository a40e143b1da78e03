//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ideabox_core::{Email, Role, UserId};

use super::CurrentUser;

/// A board member.
///
/// Users are created on their first confirmed sign-in; there are no passwords.
/// The first member of an empty board becomes its administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity stored in the session after sign-in.
    #[must_use]
    pub fn to_current(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Default display name for a new user: the local part of their address.
#[must_use]
pub fn default_name(email: &Email) -> String {
    email.local_part().to_owned()
}
