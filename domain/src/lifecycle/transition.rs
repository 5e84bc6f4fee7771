//! Transition planning for a fired stage job
//!
//! Jobs are delivered at least once and, after a restart, possibly out of
//! order. Planning therefore only ever moves a discussion forward: a stage at
//! or behind the current status is skipped, and nothing but the gate may take
//! a discussion out of `Proposed`.

use super::stage::Stage;
use crate::discussion::entities::Discussion;
use crate::discussion::status::DiscussionStatus;

/// Why a fired job leaves the discussion untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Deleted,
    Terminal(DiscussionStatus),
    AlreadyReached {
        current: DiscussionStatus,
        target: Stage,
    },
    /// The discussion never passed the quorum gate
    GateNotPassed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Deleted => write!(f, "discussion is deleted"),
            SkipReason::Terminal(status) => write!(f, "discussion is {}", status.as_str()),
            SkipReason::AlreadyReached { current, target } => {
                write!(f, "already {} (target {})", current.as_str(), target)
            }
            SkipReason::GateNotPassed => write!(f, "quorum gate was not passed"),
        }
    }
}

/// A forward status move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub from: DiscussionStatus,
    pub to: DiscussionStatus,
}

impl Advance {
    /// The move made when the quorum gate opens.
    pub fn gate() -> Self {
        Self {
            from: DiscussionStatus::Proposed,
            to: DiscussionStatus::Scheduled,
        }
    }

    /// Whether this move lands on or jumps over `Analyzing`.
    ///
    /// Out-of-order delivery can take a discussion straight from
    /// `InProgress` to `Completed`; analysis must still be requested then.
    pub fn enters_analysis(&self) -> bool {
        let analyzing = DiscussionStatus::Analyzing.rank();
        self.from.rank() < analyzing && self.to.rank() >= analyzing
    }
}

/// Outcome of planning a fired job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPlan {
    Skip(SkipReason),
    /// Consult the vote ledger before moving to `Scheduled`
    QuorumGate,
    Advance(Advance),
}

/// Decide what a fired `target` job does to `discussion`.
pub fn plan_transition(discussion: &Discussion, target: Stage) -> TransitionPlan {
    if discussion.deleted {
        return TransitionPlan::Skip(SkipReason::Deleted);
    }

    let current = discussion.status;
    if current.is_terminal() {
        return TransitionPlan::Skip(SkipReason::Terminal(current));
    }

    let wanted = target.target_status();
    if current.rank() >= wanted.rank() {
        return TransitionPlan::Skip(SkipReason::AlreadyReached { current, target });
    }

    if target.is_gate() {
        return TransitionPlan::QuorumGate;
    }

    if current == DiscussionStatus::Proposed {
        return TransitionPlan::Skip(SkipReason::GateNotPassed);
    }

    TransitionPlan::Advance(Advance {
        from: current,
        to: wanted,
    })
}
