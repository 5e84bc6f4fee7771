//! Report moderation use case
//!
//! Counts pending reports per target. Once the threshold is reached the
//! target is blocked and only then are its pending reports accepted, so a
//! failed block leaves the reports pending and the next report retries it.
//! Blocking a discussion also cancels what is left of its timeline.

use crate::ports::clock::Clock;
use crate::ports::lifecycle_event_log::{LifecycleEvent, LifecycleEventLog, NoLifecycleEventLog};
use crate::ports::repositories::{
    CommentRepository, DiscussionRepository, RepositoryError, ReportRepository,
};
use crate::use_cases::error::LifecycleError;
use crate::use_cases::orchestrator::LifecycleOrchestrator;
use debate_domain::{
    CommentId, CommentStatus, DiscussionId, DiscussionStatus, ModerationRule, ModerationVerdict,
    NewReport, ReportTarget,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ModerationOutcome {
    /// Report stored, target still below the threshold
    Recorded { pending: usize },
    /// Threshold reached; `accepted` reports moved to review
    Blocked { target: ReportTarget, accepted: usize },
}

pub struct ModerationUseCase {
    reports: Arc<dyn ReportRepository>,
    discussions: Arc<dyn DiscussionRepository>,
    comments: Arc<dyn CommentRepository>,
    orchestrator: Arc<LifecycleOrchestrator>,
    rule: ModerationRule,
    clock: Arc<dyn Clock>,
    events: Arc<dyn LifecycleEventLog>,
}

impl ModerationUseCase {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        discussions: Arc<dyn DiscussionRepository>,
        comments: Arc<dyn CommentRepository>,
        orchestrator: Arc<LifecycleOrchestrator>,
        rule: ModerationRule,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reports,
            discussions,
            comments,
            orchestrator,
            rule,
            clock,
            events: Arc::new(NoLifecycleEventLog),
        }
    }

    pub fn with_event_log(mut self, events: Arc<dyn LifecycleEventLog>) -> Self {
        self.events = events;
        self
    }

    /// Store a report and block its target if the threshold is reached.
    pub async fn on_report_added(&self, report: NewReport) -> Result<ModerationOutcome, LifecycleError> {
        self.ensure_target_exists(report.target).await?;

        self.reports
            .insert(&report, self.clock.now())
            .await
            .map_err(|e| match e {
                RepositoryError::Duplicate(_) => LifecycleError::Duplicate(format!(
                    "report by member {} on {}",
                    report.reporter, report.target
                )),
                other => other.into(),
            })?;

        let pending = self.reports.count_pending(report.target).await?;
        let pending = match self.rule.verdict(pending) {
            ModerationVerdict::BelowThreshold { pending } => {
                return Ok(ModerationOutcome::Recorded { pending });
            }
            ModerationVerdict::Block { pending } => pending,
        };

        match report.target {
            ReportTarget::Discussion(id) => self.block_discussion(id).await?,
            ReportTarget::Comment(id) => self.block_comment(id).await?,
        }
        let accepted = self.reports.accept_pending(report.target).await?;

        info!(
            "Blocked {} after {} reports ({} accepted)",
            report.target, pending, accepted
        );
        self.events.record(LifecycleEvent::new(
            "target_blocked",
            json!({ "target": report.target, "pending": pending, "accepted": accepted }),
        ));

        Ok(ModerationOutcome::Blocked {
            target: report.target,
            accepted,
        })
    }

    async fn ensure_target_exists(&self, target: ReportTarget) -> Result<(), LifecycleError> {
        let exists = match target {
            ReportTarget::Discussion(id) => self
                .discussions
                .find(id)
                .await?
                .is_some_and(|d| !d.deleted),
            ReportTarget::Comment(id) => self.comments.find(id).await?.is_some_and(|c| !c.deleted),
        };
        if exists {
            Ok(())
        } else {
            Err(LifecycleError::NotFound {
                entity: target.kind(),
                id: target.raw_id(),
            })
        }
    }

    async fn block_discussion(&self, id: DiscussionId) -> Result<(), LifecycleError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let discussion = self
                .discussions
                .find(id)
                .await?
                .ok_or_else(|| LifecycleError::discussion_not_found(id))?;

            if !discussion.status.can_be_blocked() {
                warn!(
                    "Discussion {} is {}, leaving status as is",
                    id,
                    discussion.status.as_str()
                );
                break;
            }

            match self
                .discussions
                .update_status(id, DiscussionStatus::Blocked, discussion.version)
                .await
            {
                Ok(_) => break,
                Err(e) if e.is_version_conflict() && attempt < MAX_ATTEMPTS => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.orchestrator.cancel_timeline(id).await?;
        Ok(())
    }

    async fn block_comment(&self, id: CommentId) -> Result<(), LifecycleError> {
        self.comments.set_status(id, CommentStatus::Blocked).await?;
        Ok(())
    }
}
