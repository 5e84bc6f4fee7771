//! Discussion status

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Lifecycle position of a discussion.
///
/// The forward path is `Proposed → Scheduled → InProgress → Analyzing → Completed`.
/// `Blocked` is an out-of-band terminal reachable from any non-completed
/// status through moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscussionStatus {
    #[default]
    Proposed,
    Scheduled,
    InProgress,
    Analyzing,
    Completed,
    Blocked,
}

impl DiscussionStatus {
    pub const ALL: [DiscussionStatus; 6] = [
        DiscussionStatus::Proposed,
        DiscussionStatus::Scheduled,
        DiscussionStatus::InProgress,
        DiscussionStatus::Analyzing,
        DiscussionStatus::Completed,
        DiscussionStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscussionStatus::Proposed => "PROPOSED",
            DiscussionStatus::Scheduled => "SCHEDULED",
            DiscussionStatus::InProgress => "IN_PROGRESS",
            DiscussionStatus::Analyzing => "ANALYZING",
            DiscussionStatus::Completed => "COMPLETED",
            DiscussionStatus::Blocked => "BLOCKED",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DiscussionStatus::Proposed => "Proposed",
            DiscussionStatus::Scheduled => "Scheduled",
            DiscussionStatus::InProgress => "In Progress",
            DiscussionStatus::Analyzing => "Analyzing",
            DiscussionStatus::Completed => "Completed",
            DiscussionStatus::Blocked => "Blocked",
        }
    }

    /// No lifecycle job may change a discussion in a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DiscussionStatus::Completed | DiscussionStatus::Blocked)
    }

    /// Position on the forward path. `Blocked` is off the path.
    pub fn rank(&self) -> Option<u8> {
        match self {
            DiscussionStatus::Proposed => Some(0),
            DiscussionStatus::Scheduled => Some(1),
            DiscussionStatus::InProgress => Some(2),
            DiscussionStatus::Analyzing => Some(3),
            DiscussionStatus::Completed => Some(4),
            DiscussionStatus::Blocked => None,
        }
    }

    /// Whether moderation can still force this discussion into `Blocked`.
    pub fn can_be_blocked(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for DiscussionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for DiscussionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiscussionStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}
