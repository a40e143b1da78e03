//! Idea submission and creation types.

use serde::{Deserialize, Serialize};

use super::failure::Failure;
use super::id::IdeaNumber;
use super::slug::Slug;
use super::status::IdeaStatus;

/// Maximum number of characters accepted in an idea title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Minimum number of characters for a title to count as descriptive.
const MIN_TITLE_LENGTH: usize = 10;

/// Minimum number of space-separated words for a title to count as descriptive.
const MIN_TITLE_WORDS: usize = 3;

/// An idea as submitted by a user, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdea {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl NewIdea {
    /// Create a submission; the title is trimmed.
    #[must_use]
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.trim().to_owned(),
            description: description.to_owned(),
        }
    }

    /// Check the submission against the board's title rules.
    ///
    /// An empty title reports both "required" and "more descriptive", matching
    /// what the form shows when the user submits nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] with every `title` message that applies.
    pub fn validate(&self) -> Result<(), Failure> {
        let mut failure = Failure::default();
        let title = self.title.trim();
        let length = title.chars().count();

        if title.is_empty() {
            failure.add_field("title", "Title is required.");
        }

        if length < MIN_TITLE_LENGTH || title.split(' ').count() < MIN_TITLE_WORDS {
            failure.add_field("title", "Title needs to be more descriptive.");
        }

        if length > MAX_TITLE_LENGTH {
            failure.add_field(
                "title",
                format!("Title must have at most {MAX_TITLE_LENGTH} characters."),
            );
        }

        if failure.is_empty() {
            Ok(())
        } else {
            Err(failure)
        }
    }

    /// Slug derived from the title.
    #[must_use]
    pub fn slug(&self) -> Slug {
        Slug::from_title(&self.title)
    }
}

/// A collaborator's response to an idea: a new status and an explanation.
///
/// `status` is the numeric [`IdeaStatus`] code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResponse {
    pub status: i32,
    #[serde(default)]
    pub text: String,
}

impl NewResponse {
    /// Check the status range and that some text was given.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] with `status` and `text` messages.
    pub fn validate(&self) -> Result<IdeaStatus, Failure> {
        let mut failure = Failure::default();

        let status = IdeaStatus::from_code(self.status);
        if status.is_none() {
            failure.add_field("status", "Status is invalid.");
        }

        if self.text.trim().is_empty() {
            failure.add_field("text", "Text is required.");
        }

        match status {
            Some(status) if failure.is_empty() => Ok(status),
            _ => Err(failure),
        }
    }
}

/// Identifiers of a freshly created idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaCreated {
    pub number: IdeaNumber,
    pub slug: Slug,
}

impl IdeaCreated {
    /// Path of the idea's page, e.g. `/ideas/12/add-dark-mode`.
    #[must_use]
    pub fn redirect_path(&self) -> String {
        format!("/ideas/{}/{}", self.number, self.slug)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_title() {
        assert!(NewIdea::new("Add a dark mode", "").validate().is_ok());
    }

    #[test]
    fn test_empty_title_reports_both_rules() {
        let failure = NewIdea::new("   ", "desc").validate().unwrap_err();
        assert_eq!(
            failure.for_field("title"),
            [
                "Title is required.".to_owned(),
                "Title needs to be more descriptive.".to_owned()
            ]
        );
    }

    #[test]
    fn test_short_or_few_words() {
        let short = NewIdea::new("Dark mode", "").validate().unwrap_err();
        assert_eq!(short.for_field("title").len(), 1);

        let two_words = NewIdea::new("Internationalization support", "")
            .validate()
            .unwrap_err();
        assert_eq!(
            two_words.for_field("title"),
            ["Title needs to be more descriptive.".to_owned()]
        );
    }

    #[test]
    fn test_too_long() {
        let title = format!("a very long {}", "x".repeat(MAX_TITLE_LENGTH));
        let failure = NewIdea::new(&title, "").validate().unwrap_err();
        assert!(failure.for_field("title")[0].contains("at most 100"));
    }

    #[test]
    fn test_response_rules() {
        let ok = NewResponse {
            status: 1,
            text: "On it".to_owned(),
        };
        assert_eq!(ok.validate().unwrap(), IdeaStatus::Started);

        let failure = NewResponse {
            status: 4,
            text: " ".to_owned(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(failure.for_field("status"), ["Status is invalid.".to_owned()]);
        assert_eq!(failure.for_field("text"), ["Text is required.".to_owned()]);

        let negative = NewResponse {
            status: -1,
            text: "Nope".to_owned(),
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_redirect_path() {
        let created = IdeaCreated {
            number: IdeaNumber::new(12),
            slug: NewIdea::new("Add a dark mode", "").slug(),
        };
        assert_eq!(created.redirect_path(), "/ideas/12/add-a-dark-mode");
    }
}
