//! Comment thread use case
//!
//! Writes comments at their thread position and keeps the vote ledger in
//! step: every comment carries a vote, and deleting a member's last comment
//! of a polarity withdraws that stance.

use crate::ports::clock::Clock;
use crate::ports::repositories::{CommentRepository, DiscussionRepository};
use crate::use_cases::error::LifecycleError;
use crate::use_cases::vote_ledger::VoteLedger;
use debate_domain::{Comment, CommentDraft, CommentId, CommentStatus, DiscussionId, MemberId};
use std::sync::Arc;
use tracing::{debug, info};

const DELETED_PLACEHOLDER: &str = "[deleted]";
const BLOCKED_PLACEHOLDER: &str = "[blocked]";

pub struct CommentThreadUseCase {
    discussions: Arc<dyn DiscussionRepository>,
    comments: Arc<dyn CommentRepository>,
    ledger: Arc<VoteLedger>,
    clock: Arc<dyn Clock>,
}

impl CommentThreadUseCase {
    pub fn new(
        discussions: Arc<dyn DiscussionRepository>,
        comments: Arc<dyn CommentRepository>,
        ledger: Arc<VoteLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            discussions,
            comments,
            ledger,
            clock,
        }
    }

    /// Write a root comment or a reply and record its vote.
    pub async fn write_comment(&self, draft: CommentDraft) -> Result<Comment, LifecycleError> {
        let discussion = self
            .discussions
            .find(draft.discussion_id)
            .await?
            .ok_or_else(|| LifecycleError::discussion_not_found(draft.discussion_id))?;

        if !discussion.accepts_comments() {
            return Err(LifecycleError::InvalidTransition(format!(
                "discussion {} is {} and closed to comments",
                discussion.id,
                discussion.status.as_str()
            )));
        }

        if let Some(parent_id) = draft.parent_id {
            let parent = self
                .comments
                .find(parent_id)
                .await?
                .filter(|parent| parent.discussion_id == draft.discussion_id)
                .ok_or(LifecycleError::NotFound {
                    entity: "comment",
                    id: parent_id.get(),
                })?;
            if parent.deleted {
                return Err(LifecycleError::InvalidTransition(format!(
                    "comment {} is deleted",
                    parent_id
                )));
            }
        }

        let comment = self.comments.insert(&draft, self.clock.now()).await?;
        self.ledger
            .cast_vote(draft.discussion_id, draft.author, draft.vote)
            .await?;

        debug!(
            "Comment {} placed in discussion {} at group {} / total {}",
            comment.id, comment.discussion_id, comment.group_id, comment.total_order
        );
        Ok(comment)
    }

    /// Soft-delete a comment. Only its author may do this.
    pub async fn delete_comment(
        &self,
        actor: MemberId,
        comment_id: CommentId,
    ) -> Result<bool, LifecycleError> {
        let comment = self
            .comments
            .find(comment_id)
            .await?
            .ok_or(LifecycleError::NotFound {
                entity: "comment",
                id: comment_id.get(),
            })?;

        if comment.author != actor {
            return Err(LifecycleError::Forbidden(format!(
                "member {} is not the author of comment {}",
                actor, comment_id
            )));
        }
        if comment.deleted {
            return Ok(false);
        }

        self.comments.soft_delete(comment_id).await?;
        let released = self
            .ledger
            .release_vote_if_last(comment.discussion_id, comment.author, comment.vote)
            .await?;

        info!(
            "Comment {} deleted from discussion {}{}",
            comment_id,
            comment.discussion_id,
            if released { ", stance withdrawn" } else { "" }
        );
        Ok(true)
    }

    /// The thread in display order, with hidden comments masked.
    pub async fn thread(&self, discussion_id: DiscussionId) -> Result<Vec<Comment>, LifecycleError> {
        let mut comments = self.comments.list_thread(discussion_id).await?;
        comments.sort_by_key(|c| c.total_order);
        for comment in comments.iter_mut() {
            if comment.deleted {
                comment.content = DELETED_PLACEHOLDER.to_string();
            } else if comment.status == CommentStatus::Blocked {
                comment.content = BLOCKED_PLACEHOLDER.to_string();
            }
        }
        Ok(comments)
    }
}
