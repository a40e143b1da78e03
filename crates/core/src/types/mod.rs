//! Core types for Ideabox.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod comment;
pub mod draft;
pub mod email;
pub mod failure;
pub mod id;
pub mod idea;
pub mod slug;
pub mod status;
pub mod tag;

pub use comment::NewComment;
pub use draft::{CACHE_DESCRIPTION_KEY, CACHE_TITLE_KEY, Draft};
pub use email::{Email, EmailError};
pub use failure::Failure;
pub use id::*;
pub use idea::{IdeaCreated, MAX_TITLE_LENGTH, NewIdea, NewResponse};
pub use slug::Slug;
pub use status::{IdeaStatus, Role};
pub use tag::{MAX_TAG_NAME_LENGTH, NewTag};
