//! Discussion entities

use super::analysis::AnalysisOutcome;
use super::status::DiscussionStatus;
use crate::core::ids::{BookId, DiscussionId, MemberId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a debate stays open after it starts.
pub fn debate_length() -> Duration {
    Duration::days(1)
}

/// A discussion about a book, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: DiscussionId,
    pub owner: MemberId,
    pub book: BookId,
    pub title: String,
    pub content: String,
    pub status: DiscussionStatus,
    /// Planned debate start
    pub start_date: DateTime<Utc>,
    /// Always `start_date + debate_length()`
    pub closed_at: DateTime<Utc>,
    pub views: u64,
    /// Written once by the analysis write-back
    pub analysis: Option<AnalysisOutcome>,
    /// Optimistic-concurrency counter, bumped by every status, detail or delete write
    pub version: i64,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Discussion {
    /// Whether lifecycle jobs still have anything to do for this discussion.
    pub fn is_live(&self) -> bool {
        !self.deleted && !self.status.is_terminal()
    }

    pub fn is_owned_by(&self, member: MemberId) -> bool {
        self.owner == member
    }

    /// Edits are only allowed before anyone has joined and before the gate.
    pub fn is_editable(&self, participant_count: usize) -> bool {
        !self.deleted && self.status == DiscussionStatus::Proposed && participant_count == 0
    }

    /// Whether members may still comment.
    pub fn accepts_comments(&self) -> bool {
        !self.deleted
            && matches!(
                self.status,
                DiscussionStatus::Proposed
                    | DiscussionStatus::Scheduled
                    | DiscussionStatus::InProgress
            )
    }
}

/// Input for creating a discussion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDiscussion {
    pub owner: MemberId,
    pub book: BookId,
    pub title: String,
    pub content: String,
    pub start_date: DateTime<Utc>,
}

impl NewDiscussion {
    pub fn new(
        owner: MemberId,
        book: BookId,
        title: impl Into<String>,
        content: impl Into<String>,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            owner,
            book,
            title: title.into(),
            content: content.into(),
            start_date,
        }
    }

    pub fn closed_at(&self) -> DateTime<Utc> {
        self.start_date + debate_length()
    }
}

/// Editable fields of a proposed discussion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscussionEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
}

impl DiscussionEdit {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.start_date.is_none()
    }

    /// Apply the edit to a copy of `discussion`, recomputing `closed_at`.
    pub fn apply_to(&self, discussion: &Discussion) -> Discussion {
        let mut edited = discussion.clone();
        if let Some(title) = &self.title {
            edited.title = title.clone();
        }
        if let Some(content) = &self.content {
            edited.content = content.clone();
        }
        if let Some(start) = self.start_date {
            edited.start_date = start;
            edited.closed_at = start + debate_length();
        }
        edited
    }

    /// Whether applying the edit moves the timeline.
    pub fn moves_start(&self, discussion: &Discussion) -> bool {
        self.start_date
            .is_some_and(|start| start != discussion.start_date)
    }
}
