//! Tag submissions.

use serde::{Deserialize, Serialize};

use super::failure::Failure;
use super::slug::Slug;

/// Maximum number of characters in a tag name.
pub const MAX_TAG_NAME_LENGTH: usize = 30;

/// Number of hex digits in a tag color (`RRGGBB`, no `#`).
const TAG_COLOR_LENGTH: usize = 6;

/// A tag as submitted by an administrator, for creation or edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub is_public: bool,
}

impl NewTag {
    /// Create a submission; name and color are trimmed and the color is
    /// upper-cased.
    #[must_use]
    pub fn new(name: &str, color: &str, is_public: bool) -> Self {
        Self {
            name: name.trim().to_owned(),
            color: color.trim().to_ascii_uppercase(),
            is_public,
        }
    }

    /// Check name and color.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] with `name` and `color` messages.
    pub fn validate(&self) -> Result<(), Failure> {
        let mut failure = Failure::default();

        if self.name.is_empty() {
            failure.add_field("name", "Name is required.");
        } else if self.name.chars().count() > MAX_TAG_NAME_LENGTH {
            failure.add_field(
                "name",
                format!("Name must have less than {MAX_TAG_NAME_LENGTH} characters."),
            );
        }

        if self.color.is_empty() {
            failure.add_field("color", "Color is required.");
        } else if self.color.len() != TAG_COLOR_LENGTH {
            failure.add_field(
                "color",
                format!("Color must be exactly {TAG_COLOR_LENGTH} characters."),
            );
        } else if !self.color.chars().all(|c| c.is_ascii_hexdigit()) {
            failure.add_field("color", "Color is invalid.");
        }

        if failure.is_empty() {
            Ok(())
        } else {
            Err(failure)
        }
    }

    /// Slug derived from the name, e.g. `feature-request`.
    #[must_use]
    pub fn slug(&self) -> Slug {
        Slug::from_title(&self.name)
    }
}
