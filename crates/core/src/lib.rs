//! Ideabox Core - Shared domain types.
//!
//! This crate provides the types used across all Ideabox components:
//! - `web` - The feedback board server and the idea input widget
//! - `cli` - Command-line tools for migrations and mail inspection
//! - `integration-tests` - End-to-end helpers
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no
//! database access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Newtypes for ids, emails, and slugs; roles and statuses;
//!   validation of ideas, comments, responses, and tags

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
