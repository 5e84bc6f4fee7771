//! Stage transition use case
//!
//! Runs when a stage job fires. Loads the discussion, plans the move, applies
//! the quorum gate when leaving `Proposed`, and writes the new status with an
//! optimistic version check. A conflicting write is retried once against a
//! fresh read.

use crate::ports::lifecycle_event_log::{LifecycleEvent, LifecycleEventLog, NoLifecycleEventLog};
use crate::ports::repositories::DiscussionRepository;
use crate::use_cases::analysis::AnalysisRunner;
use crate::use_cases::error::LifecycleError;
use crate::use_cases::orchestrator::LifecycleOrchestrator;
use crate::use_cases::vote_ledger::VoteLedger;
use debate_domain::{
    Advance, Discussion, DiscussionId, QuorumRule, SkipReason, Stage, Tally, TransitionPlan,
    plan_transition,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_ATTEMPTS: usize = 2;

/// What a fired job did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied(Advance),
    Skipped(SkipReason),
    /// Quorum not met; the rest of the timeline was cancelled
    GateFailed { tally: Tally, cancelled_jobs: usize },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}

pub struct TransitionUseCase {
    discussions: Arc<dyn DiscussionRepository>,
    ledger: Arc<VoteLedger>,
    orchestrator: Arc<LifecycleOrchestrator>,
    analysis: Arc<AnalysisRunner>,
    quorum: QuorumRule,
    events: Arc<dyn LifecycleEventLog>,
}

impl TransitionUseCase {
    pub fn new(
        discussions: Arc<dyn DiscussionRepository>,
        ledger: Arc<VoteLedger>,
        orchestrator: Arc<LifecycleOrchestrator>,
        analysis: Arc<AnalysisRunner>,
        quorum: QuorumRule,
    ) -> Self {
        Self {
            discussions,
            ledger,
            orchestrator,
            analysis,
            quorum,
            events: Arc::new(NoLifecycleEventLog),
        }
    }

    pub fn with_event_log(mut self, events: Arc<dyn LifecycleEventLog>) -> Self {
        self.events = events;
        self
    }

    /// Apply the stage a fired job targets.
    ///
    /// Safe to call any number of times and in any order: stages at or behind
    /// the current status are skipped.
    pub async fn attempt(
        &self,
        discussion_id: DiscussionId,
        target: Stage,
    ) -> Result<TransitionOutcome, LifecycleError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let discussion = self.load(discussion_id).await?;

            let advance = match plan_transition(&discussion, target) {
                TransitionPlan::Skip(reason) => {
                    debug!(
                        "Skipping {} for discussion {}: {}",
                        target, discussion_id, reason
                    );
                    return Ok(TransitionOutcome::Skipped(reason));
                }
                TransitionPlan::QuorumGate => {
                    let tally = self.ledger.tally(discussion_id).await?;
                    if !self.quorum.is_satisfied(&tally) {
                        return self.abort_timeline(&discussion, tally).await;
                    }
                    debug!(
                        "Quorum met for discussion {} ({})",
                        discussion_id, tally
                    );
                    Advance::gate()
                }
                TransitionPlan::Advance(advance) => advance,
            };

            match self
                .discussions
                .update_status(discussion_id, advance.to, discussion.version)
                .await
            {
                Ok(_) => {
                    self.applied(discussion_id, advance);
                    return Ok(TransitionOutcome::Applied(advance));
                }
                Err(e) if e.is_version_conflict() && attempt < MAX_ATTEMPTS => {
                    warn!(
                        "Concurrent update on discussion {} while applying {}, retrying",
                        discussion_id, target
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            "Dropping {} for discussion {} after {} conflicting attempts",
            target, discussion_id, MAX_ATTEMPTS
        );
        Err(LifecycleError::TransitionRace(discussion_id))
    }

    async fn load(&self, discussion_id: DiscussionId) -> Result<Discussion, LifecycleError> {
        self.discussions
            .find(discussion_id)
            .await?
            .ok_or_else(|| LifecycleError::discussion_not_found(discussion_id))
    }

    fn applied(&self, discussion_id: DiscussionId, advance: Advance) {
        info!(
            "Discussion {}: {} -> {}",
            discussion_id,
            advance.from.as_str(),
            advance.to.as_str()
        );
        self.events.record(LifecycleEvent::new(
            "status_changed",
            json!({ "discussion_id": discussion_id, "from": advance.from, "to": advance.to }),
        ));

        if advance.enters_analysis() {
            self.analysis.dispatch(discussion_id);
        }
    }

    async fn abort_timeline(
        &self,
        discussion: &Discussion,
        tally: Tally,
    ) -> Result<TransitionOutcome, LifecycleError> {
        info!(
            "Quorum not met for discussion {} ({}, needs {}), cancelling timeline",
            discussion.id,
            tally,
            self.quorum.description()
        );
        let cancelled_jobs = self.orchestrator.cancel_timeline(discussion.id).await?;
        self.events.record(LifecycleEvent::new(
            "gate_failed",
            json!({
                "discussion_id": discussion.id,
                "agree": tally.agree,
                "disagree": tally.disagree,
                "cancelled_jobs": cancelled_jobs,
            }),
        ));
        Ok(TransitionOutcome::GateFailed {
            tally,
            cancelled_jobs,
        })
    }
}
