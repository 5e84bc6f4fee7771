//! Vote ledger
//!
//! One participant row per (discussion, member), carrying the stance of the
//! member's latest comment. The gate counts these rows.

use crate::ports::repositories::{CommentRepository, ParticipantRepository, RepositoryError};
use crate::use_cases::error::LifecycleError;
use debate_domain::{
    DiscussionId, MemberId, Participant, Tally, VoteChange, VoteType, plan_vote, should_release,
};
use std::sync::Arc;
use tracing::debug;

pub struct VoteLedger {
    participants: Arc<dyn ParticipantRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl VoteLedger {
    pub fn new(
        participants: Arc<dyn ParticipantRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            participants,
            comments,
        }
    }

    /// Record the stance of a member's new comment.
    ///
    /// A row inserted concurrently by the same member is treated as the
    /// existing stance and replaced if it differs.
    pub async fn cast_vote(
        &self,
        discussion_id: DiscussionId,
        member_id: MemberId,
        vote: VoteType,
    ) -> Result<VoteChange, LifecycleError> {
        let existing = self.participants.find(discussion_id, member_id).await?;
        let row = Participant::new(discussion_id, member_id, vote);

        match plan_vote(existing.as_ref(), vote) {
            VoteChange::Insert(vote) => match self.participants.insert(&row).await {
                Ok(()) => Ok(VoteChange::Insert(vote)),
                Err(RepositoryError::Duplicate(_)) => {
                    debug!(
                        "Member {} joined discussion {} concurrently, re-reading stance",
                        member_id, discussion_id
                    );
                    let existing = self.participants.find(discussion_id, member_id).await?;
                    self.apply(&row, plan_vote(existing.as_ref(), vote)).await
                }
                Err(e) => Err(e.into()),
            },
            change => self.apply(&row, change).await,
        }
    }

    async fn apply(&self, row: &Participant, change: VoteChange) -> Result<VoteChange, LifecycleError> {
        match change {
            VoteChange::Unchanged => {}
            VoteChange::Insert(_) => self.participants.insert(row).await?,
            VoteChange::Replace { from, to } => {
                debug!(
                    "Member {} switches {} -> {} in discussion {}",
                    row.member_id, from, to, row.discussion_id
                );
                self.participants.replace(row).await?;
            }
        }
        Ok(change)
    }

    /// Withdraw a member's stance once their last comment of `vote` is gone.
    ///
    /// Call after the comment is soft-deleted. A row of the opposite
    /// polarity is left alone.
    pub async fn release_vote_if_last(
        &self,
        discussion_id: DiscussionId,
        member_id: MemberId,
        vote: VoteType,
    ) -> Result<bool, LifecycleError> {
        let remaining = self
            .comments
            .count_by_author_vote(discussion_id, member_id, vote)
            .await?;
        let existing = self.participants.find(discussion_id, member_id).await?;

        if !should_release(existing.as_ref(), vote, remaining) {
            return Ok(false);
        }

        let removed = self.participants.delete(discussion_id, member_id).await?;
        if removed {
            debug!(
                "Member {} withdrew from discussion {}",
                member_id, discussion_id
            );
        }
        Ok(removed)
    }

    pub async fn tally(&self, discussion_id: DiscussionId) -> Result<Tally, LifecycleError> {
        Ok(self.participants.tally(discussion_id).await?)
    }
}
