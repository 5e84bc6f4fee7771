//! Domain layer for book-debate
//!
//! This crate contains the core business rules, entities, and value objects.
//! It has no dependencies on storage, timers, or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Discussion lifecycle
//!
//! A discussion moves through `PROPOSED → SCHEDULED → IN_PROGRESS → ANALYZING →
//! COMPLETED` on a timeline derived from its start date. The first move is a
//! quorum gate over the vote ledger; moderation can force `BLOCKED` at any time.
//!
//! ## Vote ledger
//!
//! Members vote by commenting. The ledger keeps one stance per member.
//!
//! ## Thread order
//!
//! Comments share one flattened order per discussion in which reply chains
//! stay contiguous.

pub mod core;
pub mod discussion;
pub mod lifecycle;
pub mod moderation;
pub mod thread;
pub mod vote;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    ids::{BookId, CommentId, DiscussionId, MemberId, ReportId},
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use discussion::{
    analysis::{AnalysisOutcome, Verdict},
    entities::{Discussion, DiscussionEdit, NewDiscussion, debate_length},
    status::DiscussionStatus,
};
pub use lifecycle::{
    Advance, JobKey, ScheduledJob, SkipReason, Stage, TimelinePolicy, TransitionPlan,
    plan_transition,
};
pub use moderation::{
    ModerationRule, ModerationVerdict, NewReport, Report, ReportStatus, ReportTarget,
};
pub use thread::{
    Comment, CommentDraft, CommentStatus, Placement, ThreadCursor, place_into, plan_placement,
};
pub use vote::{Participant, QuorumRule, Tally, VoteChange, VoteType, plan_vote, should_release};
