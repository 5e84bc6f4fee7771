//! Fired job dispatcher
//!
//! Consumes jobs as the timer engine fires them and runs each transition on
//! its own task, so a slow transition never delays another discussion. A
//! job's durable record is removed only after its transition has been applied
//! or found unnecessary; a failed job keeps its record and is re-fired by the
//! next restore.
//!
//! A later stage that fires while its discussion still waits on the gate is
//! held: its record stays, and it is re-armed when the gate opens. A failed
//! gate cancels the timeline and removes held records with it.

use crate::ports::timer_engine::FiredJob;
use crate::use_cases::error::LifecycleError;
use crate::use_cases::orchestrator::LifecycleOrchestrator;
use crate::use_cases::transition::{TransitionOutcome, TransitionUseCase};
use debate_domain::{Advance, SkipReason};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct JobDispatcher {
    transition: Arc<TransitionUseCase>,
    orchestrator: Arc<LifecycleOrchestrator>,
}

impl JobDispatcher {
    pub fn new(transition: Arc<TransitionUseCase>, orchestrator: Arc<LifecycleOrchestrator>) -> Self {
        Self {
            transition,
            orchestrator,
        }
    }

    /// Run until `shutdown` is cancelled or the engine's channel closes.
    ///
    /// In-flight transitions are awaited before returning.
    pub async fn run(self: Arc<Self>, mut fired: mpsc::Receiver<FiredJob>, shutdown: CancellationToken) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Dispatcher shutting down");
                    break;
                }
                job = fired.recv() => match job {
                    Some(job) => {
                        let dispatcher = Arc::clone(&self);
                        in_flight.spawn(async move { dispatcher.handle(job).await });
                    }
                    None => {
                        debug!("Timer engine channel closed");
                        break;
                    }
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!("Stage job task panicked: {}", e);
                    }
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!("Stage job task panicked: {}", e);
            }
        }
        info!("Dispatcher stopped");
    }

    /// Apply one fired job and settle its durable record.
    pub async fn handle(&self, job: FiredJob) -> Option<TransitionOutcome> {
        let key = job.key;
        match self.orchestrator.is_current(&job).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Ignoring stale job {} (fired at {})", key, job.fire_at);
                return None;
            }
            Err(e) => {
                error!("Could not check record of job {}: {}", key, e);
                return None;
            }
        }

        let outcome = match self.transition.attempt(key.discussion_id, key.stage).await {
            Ok(outcome @ TransitionOutcome::Skipped(SkipReason::GateNotPassed)) => {
                debug!("Holding job {} until the gate of its discussion opens", key);
                return Some(outcome);
            }
            Ok(outcome) => Some(outcome),
            Err(e @ LifecycleError::NotFound { .. }) => {
                warn!("Dropping job {}: {}", key, e);
                None
            }
            Err(e) => {
                error!("Stage job {} failed, record kept for retry: {}", key, e);
                return None;
            }
        };

        if let Err(e) = self.orchestrator.complete_job(&job).await {
            warn!("Could not remove record of job {}: {}", key, e);
        }

        if outcome == Some(TransitionOutcome::Applied(Advance::gate())) {
            if let Err(e) = self.orchestrator.rearm_pending(key.discussion_id).await {
                warn!(
                    "Could not re-arm held jobs of discussion {}, left to the next restore: {}",
                    key.discussion_id, e
                );
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::*;
    use crate::ports::timer_engine::TimerEngine;
    use debate_domain::{DiscussionId, DiscussionStatus, JobKey, MemberId, Stage, VoteType};

    fn fired(id: DiscussionId, stage: Stage, h: &Harness) -> FiredJob {
        let record = h.store.job(JobKey::new(id, stage)).unwrap();
        FiredJob {
            key: record.key(),
            fire_at: record.fire_at,
        }
    }

    #[tokio::test]
    async fn test_handle_applies_and_removes_record() {
        let h = Harness::new();
        let id = h.store.seed_discussion(DiscussionStatus::Scheduled, start());
        h.store
            .seed_timeline(id, start(), h.orchestrator.timeline());

        let outcome = h.dispatcher.handle(fired(id, Stage::InProgress, &h)).await;

        assert!(outcome.is_some_and(|o| o.is_applied()));
        assert_eq!(h.status(id), DiscussionStatus::InProgress);
        assert!(h.store.job(JobKey::new(id, Stage::InProgress)).is_none());
    }

    #[tokio::test]
    async fn test_failed_job_keeps_record() {
        let h = Harness::new();
        let id = h.store.seed_discussion(DiscussionStatus::Scheduled, start());
        h.store
            .seed_timeline(id, start(), h.orchestrator.timeline());
        h.store.inject_conflicts(2);

        let job = fired(id, Stage::InProgress, &h);
        assert!(h.dispatcher.handle(job).await.is_none());

        assert!(h.store.job(job.key).is_some());
        assert_eq!(h.status(id), DiscussionStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_stale_job_is_ignored() {
        let h = Harness::new();
        let id = h.store.seed_discussion(DiscussionStatus::Scheduled, start());
        h.store
            .seed_timeline(id, start(), h.orchestrator.timeline());
        let mut job = fired(id, Stage::InProgress, &h);
        job.fire_at -= chrono::Duration::hours(1);

        assert!(h.dispatcher.handle(job).await.is_none());

        assert_eq!(h.status(id), DiscussionStatus::Scheduled);
        assert!(h.store.job(job.key).is_some());
    }

    #[tokio::test]
    async fn test_cancelled_job_is_ignored() {
        let h = Harness::new();
        let id = h.store.seed_discussion(DiscussionStatus::Scheduled, start());
        h.store
            .seed_timeline(id, start(), h.orchestrator.timeline());
        let job = fired(id, Stage::InProgress, &h);
        h.store.drop_job(job.key);

        assert!(h.dispatcher.handle(job).await.is_none());
        assert_eq!(h.status(id), DiscussionStatus::Scheduled);
    }

    async fn reach_quorum(h: &Harness, id: DiscussionId) {
        for (member, vote) in [
            (1, VoteType::Agree),
            (2, VoteType::Agree),
            (3, VoteType::Disagree),
            (4, VoteType::Disagree),
        ] {
            h.ledger.cast_vote(id, MemberId(member), vote).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_stage_before_gate_is_held_and_rearmed() {
        let h = Harness::new();
        let id = h.create_registered(start()).await;
        reach_quorum(&h, id).await;
        let early = fired(id, Stage::InProgress, &h);

        let outcome = h.dispatcher.handle(early).await;
        assert_eq!(
            outcome,
            Some(TransitionOutcome::Skipped(SkipReason::GateNotPassed))
        );
        assert!(h.store.job(early.key).is_some());

        let gate = h.dispatcher.handle(fired(id, Stage::Scheduled, &h)).await;
        assert_eq!(gate, Some(TransitionOutcome::Applied(Advance::gate())));
        assert_eq!(h.engine.armed_at(early.key), Some(early.fire_at));

        let outcome = h.dispatcher.handle(early).await;
        assert!(outcome.is_some_and(|o| o.is_applied()));
        assert_eq!(h.status(id), DiscussionStatus::InProgress);
        assert!(h.store.job(early.key).is_none());
        assert_eq!(h.store.jobs_for(id).len(), 2);
    }

    #[tokio::test]
    async fn test_failed_gate_removes_held_stages() {
        let h = Harness::new();
        let id = h.create_registered(start()).await;
        let early = fired(id, Stage::InProgress, &h);

        h.dispatcher.handle(early).await;
        let gate = h.dispatcher.handle(fired(id, Stage::Scheduled, &h)).await;

        assert!(matches!(gate, Some(TransitionOutcome::GateFailed { .. })));
        assert!(h.store.jobs_for(id).is_empty());
        assert_eq!(h.engine.armed_count(), 0);
        assert_eq!(h.status(id), DiscussionStatus::Proposed);
    }

    #[tokio::test]
    async fn test_run_drains_channel_until_closed() {
        let h = Harness::new();
        let id = h.store.seed_discussion(DiscussionStatus::Scheduled, start());
        h.store
            .seed_timeline(id, start(), h.orchestrator.timeline());
        let (tx, rx) = mpsc::channel(8);
        tx.send(fired(id, Stage::InProgress, &h)).await.unwrap();
        drop(tx);

        Arc::clone(&h.dispatcher)
            .run(rx, CancellationToken::new())
            .await;

        assert_eq!(h.status(id), DiscussionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let h = Harness::new();
        let (_tx, rx) = mpsc::channel::<FiredJob>(8);
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        Arc::clone(&h.dispatcher).run(rx, shutdown).await;
    }
}
