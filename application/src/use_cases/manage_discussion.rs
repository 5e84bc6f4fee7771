//! Discussion management use case
//!
//! Create, edit and delete discussions, keeping their stage timeline in step.
//! Also serves the read side: summaries with tally and pending jobs, view
//! counting and the manual analysis write-back.

use crate::ports::clock::Clock;
use crate::ports::directory::{BookCatalog, MemberDirectory};
use crate::ports::repositories::DiscussionRepository;
use crate::use_cases::error::LifecycleError;
use crate::use_cases::orchestrator::LifecycleOrchestrator;
use crate::use_cases::vote_ledger::VoteLedger;
use debate_domain::{
    AnalysisOutcome, Discussion, DiscussionEdit, DiscussionId, MemberId, NewDiscussion,
    ScheduledJob, Tally,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// A discussion with its current tally and pending jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscussionSummary {
    pub discussion: Discussion,
    pub tally: Tally,
    pub pending_jobs: Vec<ScheduledJob>,
}

pub struct ManageDiscussionUseCase {
    discussions: Arc<dyn DiscussionRepository>,
    ledger: Arc<VoteLedger>,
    members: Arc<dyn MemberDirectory>,
    books: Arc<dyn BookCatalog>,
    orchestrator: Arc<LifecycleOrchestrator>,
    clock: Arc<dyn Clock>,
}

impl ManageDiscussionUseCase {
    pub fn new(
        discussions: Arc<dyn DiscussionRepository>,
        ledger: Arc<VoteLedger>,
        members: Arc<dyn MemberDirectory>,
        books: Arc<dyn BookCatalog>,
        orchestrator: Arc<LifecycleOrchestrator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            discussions,
            ledger,
            members,
            books,
            orchestrator,
            clock,
        }
    }

    /// Persist a proposed discussion and register its timeline.
    ///
    /// If the timeline cannot be registered the discussion is soft-deleted
    /// again and the scheduling failure is returned.
    pub async fn create(&self, new: NewDiscussion) -> Result<Discussion, LifecycleError> {
        if !self.members.member_exists(new.owner).await? {
            return Err(LifecycleError::NotFound {
                entity: "member",
                id: new.owner.get(),
            });
        }
        if !self.books.book_exists(new.book).await? {
            return Err(LifecycleError::NotFound {
                entity: "book",
                id: new.book.get(),
            });
        }

        let now = self.clock.now();
        self.orchestrator
            .timeline()
            .validate_start(new.start_date, now)?;

        let discussion = self.discussions.insert(&new, now).await?;

        if let Err(e) = self
            .orchestrator
            .register_timeline(discussion.id, discussion.start_date)
            .await
        {
            warn!(
                "Timeline registration failed for discussion {}, withdrawing it: {}",
                discussion.id, e
            );
            if let Err(cleanup) = self
                .discussions
                .soft_delete(discussion.id, now, discussion.version)
                .await
            {
                warn!(
                    "Could not withdraw discussion {}: {}",
                    discussion.id, cleanup
                );
            }
            return Err(e);
        }

        info!(
            "Created discussion {} '{}' starting {}",
            discussion.id, discussion.title, discussion.start_date
        );
        Ok(discussion)
    }

    /// Edit a proposed discussion nobody has joined yet.
    ///
    /// Moving the start date moves the pending jobs with it.
    pub async fn edit(
        &self,
        actor: MemberId,
        id: DiscussionId,
        edit: DiscussionEdit,
    ) -> Result<Discussion, LifecycleError> {
        let discussion = self.load(id).await?;
        if !discussion.is_owned_by(actor) {
            return Err(LifecycleError::Forbidden(format!(
                "member {} does not own discussion {}",
                actor, id
            )));
        }

        let participants = self.ledger.tally(id).await?.total();
        if !discussion.is_editable(participants) {
            return Err(LifecycleError::InvalidTransition(format!(
                "discussion {} is {} with {} participants and can no longer be edited",
                id,
                discussion.status.as_str(),
                participants
            )));
        }
        if edit.is_empty() {
            return Ok(discussion);
        }

        let moves_start = edit.moves_start(&discussion);
        if moves_start {
            let start = edit.apply_to(&discussion).start_date;
            self.orchestrator
                .timeline()
                .validate_start(start, self.clock.now())?;
        }

        let edited = self
            .discussions
            .update_details(&edit.apply_to(&discussion), discussion.version)
            .await?;

        // Votes do not bump the version, so a member may have joined since the tally.
        let participants = self.ledger.tally(id).await?.total();
        if participants > 0 {
            warn!(
                "Member joined discussion {} during edit, restoring previous details",
                id
            );
            self.discussions
                .update_details(&discussion, edited.version)
                .await?;
            return Err(LifecycleError::InvalidTransition(format!(
                "discussion {} gained {} participants and can no longer be edited",
                id, participants
            )));
        }

        if moves_start {
            self.orchestrator.reschedule(id, edited.start_date).await?;
        }

        info!("Edited discussion {}", id);
        Ok(edited)
    }

    /// Soft-delete a discussion and cancel its timeline. Owner only.
    pub async fn delete(&self, actor: MemberId, id: DiscussionId) -> Result<(), LifecycleError> {
        let discussion = self.load(id).await?;
        if !discussion.is_owned_by(actor) {
            return Err(LifecycleError::Forbidden(format!(
                "member {} does not own discussion {}",
                actor, id
            )));
        }
        if discussion.deleted {
            return Ok(());
        }

        self.discussions
            .soft_delete(id, self.clock.now(), discussion.version)
            .await?;
        self.orchestrator.cancel_timeline(id).await?;

        info!("Deleted discussion {}", id);
        Ok(())
    }

    pub async fn get(&self, id: DiscussionId) -> Result<DiscussionSummary, LifecycleError> {
        let discussion = self.load(id).await?;
        let tally = self.ledger.tally(id).await?;
        let pending_jobs = self.orchestrator.pending_jobs(id).await?;
        Ok(DiscussionSummary {
            discussion,
            tally,
            pending_jobs,
        })
    }

    pub async fn record_view(&self, id: DiscussionId) -> Result<(), LifecycleError> {
        let discussion = self.load(id).await?;
        if discussion.deleted {
            return Err(LifecycleError::discussion_not_found(id));
        }
        Ok(self.discussions.increment_views(id).await?)
    }

    /// Store an externally produced analysis. Later results are ignored.
    pub async fn record_analysis(
        &self,
        id: DiscussionId,
        outcome: AnalysisOutcome,
    ) -> Result<bool, LifecycleError> {
        self.load(id).await?;
        Ok(self.discussions.record_analysis(id, &outcome).await?)
    }

    async fn load(&self, id: DiscussionId) -> Result<Discussion, LifecycleError> {
        self.discussions
            .find(id)
            .await?
            .ok_or_else(|| LifecycleError::discussion_not_found(id))
    }
}
