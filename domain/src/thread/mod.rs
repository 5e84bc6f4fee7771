//! Comment thread domain
//!
//! Comments of one discussion share a single flattened order (`total_order`)
//! in which every thread group stays contiguous:
//!
//! ```text
//! total  group  comment
//!   1      1    root A
//!   2      1      reply A.1
//!   3      1      reply A.2        ◀ a new reply to A lands at 4,
//!   4      2    root B               B and everything after shifts by one
//!   5      2      reply B.1
//! ```
//!
//! - [`comment::Comment`]: a persisted comment
//! - [`ordering`]: placement planning for roots and replies

pub mod comment;
pub mod ordering;

pub use comment::{Comment, CommentDraft, CommentStatus};
pub use ordering::{Placement, ThreadCursor, place_into, plan_placement};
