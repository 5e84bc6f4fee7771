//! Discussion lifecycle domain
//!
//! # Stages
//!
//! ```text
//!  PROPOSED ──gate──▶ SCHEDULED ──start──▶ IN_PROGRESS ──Δ1──▶ ANALYZING ──Δ2──▶ COMPLETED
//!     │                   │                     │                  │
//!     └───────────────────┴─────── moderation ──┴──────────────────┴──▶ BLOCKED
//! ```
//!
//! Each forward arrow is a [`Stage`] fired by a scheduled job. The gate only
//! opens when the vote ledger satisfies the [`QuorumRule`](crate::vote::QuorumRule);
//! otherwise the remaining jobs are cancelled and the discussion stays proposed.
//!
//! - [`stage::Stage`]: the four scheduled transitions
//! - [`timeline::TimelinePolicy`]: fire-time offsets relative to the start date
//! - [`transition`]: pure decision for a single fired job
//! - [`job::ScheduledJob`]: durable record of one pending stage

pub mod job;
pub mod stage;
pub mod timeline;
pub mod transition;

pub use job::{JobKey, ScheduledJob};
pub use stage::Stage;
pub use timeline::TimelinePolicy;
pub use transition::{Advance, SkipReason, TransitionPlan, plan_transition};
