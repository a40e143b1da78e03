//! Stored tags.

use serde::Serialize;

use ideabox_core::{Slug, TagId};

/// A label collaborators attach to ideas.
///
/// Private tags are only shown to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: Slug,
    /// `RRGGBB`, upper-case, without `#`.
    pub color: String,
    pub is_public: bool,
}
