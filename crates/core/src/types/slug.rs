//! URL slugs derived from idea titles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A URL-safe slug: lowercase ASCII alphanumerics separated by single dashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Slug used when a title has no alphanumeric characters at all.
    pub const FALLBACK: &'static str = "idea";

    /// Build a slug from free text.
    ///
    /// ```
    /// use ideabox_core::Slug;
    ///
    /// assert_eq!(Slug::from_title("Add dark mode, please!").as_str(), "add-dark-mode-please");
    /// assert_eq!(Slug::from_title("¿¿??").as_str(), "idea");
    /// ```
    #[must_use]
    pub fn from_title(title: &str) -> Self {
        let mut slug = String::with_capacity(title.len());
        let mut pending_dash = false;

        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }

        if slug.is_empty() {
            slug.push_str(Self::FALLBACK);
        }
        Self(slug)
    }

    /// Wrap a slug read back from storage.
    #[must_use]
    pub const fn from_stored(slug: String) -> Self {
        Self(slug)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_separators() {
        assert_eq!(
            Slug::from_title("  Export   ideas -- to CSV  ").as_str(),
            "export-ideas-to-csv"
        );
    }

    #[test]
    fn test_drops_non_ascii() {
        assert_eq!(Slug::from_title("Café au lait 2").as_str(), "caf-au-lait-2");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(Slug::from_title("").as_str(), Slug::FALLBACK);
        assert_eq!(Slug::from_title("!!!").as_str(), Slug::FALLBACK);
    }
}
