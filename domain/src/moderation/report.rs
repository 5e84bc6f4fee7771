//! Report entities

use crate::core::error::DomainError;
use crate::core::ids::{CommentId, DiscussionId, MemberId, ReportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a report is filed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReportTarget {
    Discussion(DiscussionId),
    Comment(CommentId),
}

impl ReportTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            ReportTarget::Discussion(_) => "discussion",
            ReportTarget::Comment(_) => "comment",
        }
    }

    pub fn raw_id(&self) -> i64 {
        match self {
            ReportTarget::Discussion(id) => id.get(),
            ReportTarget::Comment(id) => id.get(),
        }
    }

    pub fn from_parts(kind: &str, id: i64) -> Result<Self, DomainError> {
        match kind {
            "discussion" => Ok(ReportTarget::Discussion(DiscussionId(id))),
            "comment" => Ok(ReportTarget::Comment(CommentId(id))),
            other => Err(DomainError::UnknownValue {
                field: "report target",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ReportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    #[default]
    Pending,
    /// Threshold crossed; the target is blocked and awaits human review
    AcceptedPendingReview,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::AcceptedPendingReview => "ACCEPTED_PENDING_REVIEW",
            ReportStatus::Rejected => "REJECTED",
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ReportStatus::Pending),
            "ACCEPTED_PENDING_REVIEW" => Ok(ReportStatus::AcceptedPendingReview),
            "REJECTED" => Ok(ReportStatus::Rejected),
            _ => Err(DomainError::UnknownValue {
                field: "report status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub reporter: MemberId,
    pub target: ReportTarget,
    pub reason: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub reporter: MemberId,
    pub target: ReportTarget,
    pub reason: String,
}

impl NewReport {
    pub fn new(reporter: MemberId, target: ReportTarget, reason: impl Into<String>) -> Self {
        Self {
            reporter,
            target,
            reason: reason.into(),
        }
    }
}
