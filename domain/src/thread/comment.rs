//! Comment entities

use crate::core::error::DomainError;
use crate::core::ids::{CommentId, DiscussionId, MemberId};
use crate::vote::VoteType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation status of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentStatus {
    #[default]
    Active,
    Blocked,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Active => "ACTIVE",
            CommentStatus::Blocked => "BLOCKED",
        }
    }
}

impl std::str::FromStr for CommentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(CommentStatus::Active),
            "BLOCKED" => Ok(CommentStatus::Blocked),
            _ => Err(DomainError::UnknownValue {
                field: "comment status",
                value: s.to_string(),
            }),
        }
    }
}

/// A persisted comment with its thread position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub discussion_id: DiscussionId,
    pub author: MemberId,
    /// `None` for roots
    pub parent_id: Option<CommentId>,
    /// Shared by a root and all of its descendants
    pub group_id: i64,
    /// Position within the group (root is 0)
    pub group_order: i64,
    /// Position within the whole discussion
    pub total_order: i64,
    pub vote: VoteType,
    pub status: CommentStatus,
    pub content: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_visible(&self) -> bool {
        !self.deleted && self.status == CommentStatus::Active
    }

    /// Indentation depth for flat rendering: roots at 0, replies at 1.
    pub fn depth(&self) -> usize {
        usize::from(!self.is_root())
    }
}

/// A comment about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentDraft {
    pub discussion_id: DiscussionId,
    pub author: MemberId,
    pub parent_id: Option<CommentId>,
    pub vote: VoteType,
    pub content: String,
}

impl CommentDraft {
    pub fn root(
        discussion_id: DiscussionId,
        author: MemberId,
        vote: VoteType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            discussion_id,
            author,
            parent_id: None,
            vote,
            content: content.into(),
        }
    }

    pub fn reply(
        discussion_id: DiscussionId,
        author: MemberId,
        parent_id: CommentId,
        vote: VoteType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            discussion_id,
            author,
            parent_id: Some(parent_id),
            vote,
            content: content.into(),
        }
    }
}
