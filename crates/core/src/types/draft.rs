//! Unsaved idea text cached between page loads.

use serde::{Deserialize, Serialize};

/// Cache key holding the draft title.
pub const CACHE_TITLE_KEY: &str = "IdeaInput-Title";

/// Cache key holding the draft description.
pub const CACHE_DESCRIPTION_KEY: &str = "IdeaInput-Description";

/// A locally cached, unsaved idea.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Draft {
    /// Build a draft from optional cached values; missing entries become `""`.
    #[must_use]
    pub fn from_cached(title: Option<String>, description: Option<String>) -> Self {
        Self {
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
        }
    }

    /// A draft can be submitted once it has a title.
    #[must_use]
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cached_defaults_to_empty() {
        let draft = Draft::from_cached(None, Some("details".to_owned()));
        assert_eq!(draft.title, "");
        assert_eq!(draft.description, "details");
        assert!(!draft.has_title());
    }
}
