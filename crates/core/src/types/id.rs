//! Newtype IDs for type-safe entity references.
//!
//! Database ids never leave the server; the public handle of an idea is its
//! [`IdeaNumber`], which is what appears in URLs.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Define a type-safe wrapper around an `i32` database id.
///
/// ```rust
/// # use ideabox_core::define_id;
/// define_id!(VoteId);
///
/// let id = VoteId::new(7);
/// assert_eq!(id.as_i32(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw id.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the raw id.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(UserId);
define_id!(IdeaId);
define_id!(TagId);
define_id!(CommentId);

/// Public, sequential number of an idea on the board.
///
/// Numbers start at 1 and are assigned in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaNumber(i32);

impl IdeaNumber {
    /// The number given to the first idea on an empty board.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw idea number.
    #[must_use]
    pub const fn new(number: i32) -> Self {
        Self(number)
    }

    /// Get the raw number.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// The number that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for IdeaNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
