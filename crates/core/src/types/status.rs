//! Role and status enums.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a board member is allowed to do.
///
/// Ordered by privilege, so `role >= Role::Collaborator` reads as "at least a
/// collaborator".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Submits ideas and comments.
    #[default]
    Visitor,
    /// Also edits ideas, responds to them, and assigns tags.
    Collaborator,
    /// Also manages tags and member roles.
    Administrator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visitor => write!(f, "visitor"),
            Self::Collaborator => write!(f, "collaborator"),
            Self::Administrator => write!(f, "administrator"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visitor" => Ok(Self::Visitor),
            "collaborator" => Ok(Self::Collaborator),
            "administrator" => Ok(Self::Administrator),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Where an idea stands, as set by a collaborator's response.
///
/// On the wire a response carries the numeric [`code`](Self::code), so an
/// out-of-range value can be reported as a field failure instead of a
/// malformed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "idea_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    #[default]
    New,
    Started,
    Completed,
    Declined,
}

impl IdeaStatus {
    /// Status for a numeric code, `0` (new) through `3` (declined).
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::New),
            1 => Some(Self::Started),
            2 => Some(Self::Completed),
            3 => Some(Self::Declined),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::New => 0,
            Self::Started => 1,
            Self::Completed => 2,
            Self::Declined => 3,
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Started => write!(f, "started"),
            Self::Completed => write!(f, "completed"),
            Self::Declined => write!(f, "declined"),
        }
    }
}
