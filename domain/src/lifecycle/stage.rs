//! Scheduled lifecycle stages

use crate::core::error::DomainError;
use crate::discussion::status::DiscussionStatus;
use serde::{Deserialize, Serialize};

/// A transition fired by the scheduler, named after the status it moves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Quorum gate, just before the start date
    Scheduled,
    /// Debate opens at the start date
    InProgress,
    /// Debate closes and analysis is requested
    Analyzing,
    /// Results are final
    Completed,
}

impl Stage {
    /// All stages in firing order.
    pub const ALL: [Stage; 4] = [
        Stage::Scheduled,
        Stage::InProgress,
        Stage::Analyzing,
        Stage::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Scheduled => "scheduled",
            Stage::InProgress => "in_progress",
            Stage::Analyzing => "analyzing",
            Stage::Completed => "completed",
        }
    }

    /// Status a discussion holds once this stage has been applied.
    pub fn target_status(&self) -> DiscussionStatus {
        match self {
            Stage::Scheduled => DiscussionStatus::Scheduled,
            Stage::InProgress => DiscussionStatus::InProgress,
            Stage::Analyzing => DiscussionStatus::Analyzing,
            Stage::Completed => DiscussionStatus::Completed,
        }
    }

    /// The stage that moves a discussion into `status`, if any.
    pub fn entering(status: DiscussionStatus) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.target_status() == status)
    }

    /// Whether this stage consults the vote ledger.
    pub fn is_gate(&self) -> bool {
        matches!(self, Stage::Scheduled)
    }

    /// Stages that still have to fire for a discussion currently in `status`.
    ///
    /// Terminal statuses have nothing left.
    pub fn remaining_after(status: DiscussionStatus) -> &'static [Stage] {
        match status {
            DiscussionStatus::Proposed => &[
                Stage::Scheduled,
                Stage::InProgress,
                Stage::Analyzing,
                Stage::Completed,
            ],
            DiscussionStatus::Scheduled => &[Stage::InProgress, Stage::Analyzing, Stage::Completed],
            DiscussionStatus::InProgress => &[Stage::Analyzing, Stage::Completed],
            DiscussionStatus::Analyzing => &[Stage::Completed],
            DiscussionStatus::Completed | DiscussionStatus::Blocked => &[],
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::UnknownStage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_after_each_status() {
        assert_eq!(Stage::remaining_after(DiscussionStatus::Proposed).len(), 4);
        assert_eq!(
            Stage::remaining_after(DiscussionStatus::InProgress),
            &[Stage::Analyzing, Stage::Completed]
        );
        assert_eq!(
            Stage::remaining_after(DiscussionStatus::Analyzing),
            &[Stage::Completed]
        );
        assert!(Stage::remaining_after(DiscussionStatus::Completed).is_empty());
        assert!(Stage::remaining_after(DiscussionStatus::Blocked).is_empty());
    }

    #[test]
    fn test_entering_inverts_target_status() {
        for stage in Stage::ALL {
            assert_eq!(Stage::entering(stage.target_status()), Some(stage));
        }
        assert_eq!(Stage::entering(DiscussionStatus::Proposed), None);
        assert_eq!(Stage::entering(DiscussionStatus::Blocked), None);
    }

    #[test]
    fn test_only_scheduled_is_gate() {
        assert!(Stage::Scheduled.is_gate());
        assert!(!Stage::InProgress.is_gate());
    }

    #[test]
    fn test_parse_stage() {
        assert_eq!("analyzing".parse::<Stage>(), Ok(Stage::Analyzing));
        assert_eq!("IN_PROGRESS".parse::<Stage>(), Ok(Stage::InProgress));
        assert!("archived".parse::<Stage>().is_err());
    }
}
