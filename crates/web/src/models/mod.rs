//! Domain models for the board.

pub mod comment;
pub mod idea;
pub mod session;
pub mod tag;
pub mod user;

pub use comment::Comment;
pub use idea::{Idea, IdeaResponse};
pub use session::{CurrentUser, keys as session_keys};
pub use tag::Tag;
pub use user::User;
