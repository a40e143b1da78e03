//! Comment submissions.

use serde::{Deserialize, Serialize};

use super::failure::Failure;

/// A comment on an idea, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    #[serde(default)]
    pub content: String,
}

impl NewComment {
    #[must_use]
    pub fn new(content: &str) -> Self {
        Self {
            content: content.trim().to_owned(),
        }
    }

    /// # Errors
    ///
    /// Returns a `content` failure when the comment is blank.
    pub fn validate(&self) -> Result<(), Failure> {
        if self.content.trim().is_empty() {
            return Err(Failure::field("content", "Comment is required."));
        }
        Ok(())
    }
}
