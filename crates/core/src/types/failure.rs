//! Form failure payload shared by the server and the idea input widget.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Validation or submission failure shown inline on a form.
///
/// `messages` are form-level; `failures` holds messages per field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failures: BTreeMap<String, Vec<String>>,
}

impl Failure {
    /// A failure with a single form-level message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
            failures: BTreeMap::new(),
        }
    }

    /// A failure with a single message attached to `field`.
    #[must_use]
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut failure = Self::default();
        failure.add_field(field, message);
        failure
    }

    /// Attach another message to `field`.
    pub fn add_field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.failures
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` when there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.failures.values().all(Vec::is_empty)
    }

    /// Messages attached to `field`, if any.
    #[must_use]
    pub fn for_field(&self, field: &str) -> &[String] {
        self.failures.get(field).map_or(&[][..], Vec::as_slice)
    }

    /// Every message, form-level first, as a flat list.
    #[must_use]
    pub fn all_messages(&self) -> Vec<&str> {
        self.messages
            .iter()
            .chain(self.failures.values().flatten())
            .map(String::as_str)
            .collect()
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.all_messages().join(" "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_group_by_field() {
        let mut failure = Failure::message("Please sign in.");
        failure.add_field("title", "Title is required.");
        failure.add_field("title", "Title needs to be more descriptive.");

        assert_eq!(failure.for_field("title").len(), 2);
        assert_eq!(failure.messages, vec!["Please sign in."]);
        assert_eq!(
            failure.to_string(),
            "Please sign in. Title is required. Title needs to be more descriptive."
        );
    }

    #[test]
    fn test_wire_format_omits_empty_parts() {
        let json = serde_json::to_string(&Failure::message("Nope")).unwrap();
        assert_eq!(json, r#"{"messages":["Nope"]}"#);

        let parsed: Failure = serde_json::from_str(r#"{"failures":{"title":["x"]}}"#).unwrap();
        assert!(parsed.messages.is_empty());
        assert_eq!(parsed.for_field("title"), ["x".to_owned()]);
    }

    #[test]
    fn test_is_empty() {
        assert!(Failure::default().is_empty());
        assert!(!Failure::message("x").is_empty());
    }
}
