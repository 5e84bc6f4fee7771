//! Typed identifiers.
//!
//! Every aggregate is keyed by a storage-assigned `i64`. Wrapping them keeps a
//! `CommentId` from ever being passed where a `DiscussionId` is expected.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a discussion thread.
    DiscussionId
);
define_id!(
    /// Identifier of a member (owner, commenter, reporter).
    MemberId
);
define_id!(
    /// Identifier of a book in the external catalog.
    BookId
);
define_id!(
    /// Identifier of a comment within a discussion.
    CommentId
);
define_id!(
    /// Identifier of a moderation report.
    ReportId
);
