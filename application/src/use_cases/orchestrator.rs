//! Lifecycle orchestrator
//!
//! Façade over the durable schedule and the timer engine. Application code
//! calls it when a discussion is created, edited or deleted; the transition
//! use case calls it when the quorum gate fails and moderation calls it when a
//! discussion is blocked.
//!
//! Registrations are refused until the restorer has re-armed the jobs that
//! survived the last shutdown, so a fresh registration can never race the
//! reconciliation pass.

use crate::ports::lifecycle_event_log::{LifecycleEvent, LifecycleEventLog, NoLifecycleEventLog};
use crate::ports::repositories::ScheduledJobStore;
use crate::ports::timer_engine::{FiredJob, SchedulingError, TimerEngine};
use crate::use_cases::error::LifecycleError;
use chrono::{DateTime, Utc};
use debate_domain::{DiscussionId, ScheduledJob, TimelinePolicy};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

pub struct LifecycleOrchestrator {
    jobs: Arc<dyn ScheduledJobStore>,
    engine: Arc<dyn TimerEngine>,
    timeline: TimelinePolicy,
    events: Arc<dyn LifecycleEventLog>,
    ready: AtomicBool,
}

impl LifecycleOrchestrator {
    pub fn new(
        jobs: Arc<dyn ScheduledJobStore>,
        engine: Arc<dyn TimerEngine>,
        timeline: TimelinePolicy,
    ) -> Self {
        Self {
            jobs,
            engine,
            timeline,
            events: Arc::new(NoLifecycleEventLog),
            ready: AtomicBool::new(false),
        }
    }

    pub fn with_event_log(mut self, events: Arc<dyn LifecycleEventLog>) -> Self {
        self.events = events;
        self
    }

    pub fn timeline(&self) -> &TimelinePolicy {
        &self.timeline
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub(crate) fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    fn ensure_ready(&self) -> Result<(), LifecycleError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(SchedulingError::NotReady.into())
        }
    }

    /// Record and arm the four stage jobs of a new discussion.
    ///
    /// Either all four are recorded and armed, or none are.
    pub async fn register_timeline(
        &self,
        discussion_id: DiscussionId,
        start: DateTime<Utc>,
    ) -> Result<Vec<ScheduledJob>, LifecycleError> {
        self.ensure_ready()?;

        let jobs: Vec<ScheduledJob> = self
            .timeline
            .timeline(start)
            .into_iter()
            .map(|(stage, fire_at)| ScheduledJob::new(discussion_id, stage, fire_at))
            .collect();

        self.jobs
            .upsert_all(&jobs)
            .await
            .map_err(LifecycleError::scheduling)?;

        for job in &jobs {
            if let Err(e) = self.engine.arm(job) {
                warn!(
                    "Arming {} failed, rolling back timeline of discussion {}: {}",
                    job.key(),
                    discussion_id,
                    e
                );
                self.engine.disarm_all(discussion_id);
                if let Err(cleanup) = self.jobs.delete_all(discussion_id).await {
                    warn!(
                        "Could not remove records of discussion {}: {}",
                        discussion_id, cleanup
                    );
                }
                return Err(e.into());
            }
            debug!("Armed {} at {}", job.key(), job.fire_at);
        }

        info!(
            "Registered timeline for discussion {} starting {}",
            discussion_id, start
        );
        self.events.record(LifecycleEvent::new(
            "timeline_registered",
            json!({
                "discussion_id": discussion_id,
                "start": start,
                "jobs": jobs.iter().map(|j| json!({"stage": j.stage, "fire_at": j.fire_at})).collect::<Vec<_>>(),
            }),
        ));

        Ok(jobs)
    }

    /// Move the recorded, not yet fired jobs of a discussion to a new start.
    ///
    /// Stored fire times are updated and the matching timers are re-armed on
    /// the spot. Stages that already fired have no record and stay fired.
    pub async fn reschedule(
        &self,
        discussion_id: DiscussionId,
        new_start: DateTime<Utc>,
    ) -> Result<usize, LifecycleError> {
        self.ensure_ready()?;

        let fire_times = self.timeline.timeline(new_start);
        let updated = self
            .jobs
            .update_fire_times(discussion_id, &fire_times)
            .await
            .map_err(LifecycleError::scheduling)?;

        for job in &updated {
            self.engine.arm(job)?;
        }

        info!(
            "Rescheduled {} jobs of discussion {} to start {}",
            updated.len(),
            discussion_id,
            new_start
        );
        self.events.record(LifecycleEvent::new(
            "timeline_rescheduled",
            json!({ "discussion_id": discussion_id, "start": new_start, "jobs": updated.len() }),
        ));

        Ok(updated.len())
    }

    /// Remove every pending job of a discussion and disarm its timers.
    ///
    /// A job that already fired is not retracted; only later stages are prevented.
    pub async fn cancel_timeline(&self, discussion_id: DiscussionId) -> Result<usize, LifecycleError> {
        let disarmed = self.engine.disarm_all(discussion_id);
        let removed = self
            .jobs
            .delete_all(discussion_id)
            .await
            .map_err(LifecycleError::scheduling)?;

        info!(
            "Cancelled timeline of discussion {} ({} records, {} timers)",
            discussion_id, removed, disarmed
        );
        self.events.record(LifecycleEvent::new(
            "timeline_cancelled",
            json!({ "discussion_id": discussion_id, "removed": removed, "disarmed": disarmed }),
        ));

        Ok(removed)
    }

    /// Pending records of a discussion, in firing order.
    pub async fn pending_jobs(
        &self,
        discussion_id: DiscussionId,
    ) -> Result<Vec<ScheduledJob>, LifecycleError> {
        let mut jobs = self.jobs.list_for(discussion_id).await?;
        jobs.sort_by_key(|job| job.stage);
        Ok(jobs)
    }

    pub(crate) fn rearm(&self, job: &ScheduledJob) -> Result<(), SchedulingError> {
        self.engine.arm(job)
    }

    /// Re-arm every remaining record of a discussion at its stored fire time.
    ///
    /// Used once the gate opens so that stages which fired early and were held
    /// run again.
    pub(crate) async fn rearm_pending(&self, discussion_id: DiscussionId) -> Result<usize, LifecycleError> {
        let jobs = self.pending_jobs(discussion_id).await?;
        for job in &jobs {
            self.engine.arm(job)?;
        }
        debug!("Re-armed {} jobs of discussion {}", jobs.len(), discussion_id);
        Ok(jobs.len())
    }

    /// Whether a fired job still matches its durable record.
    ///
    /// A job whose record is gone (cancelled) or moved (rescheduled, possibly
    /// by another process sharing the store) is stale.
    pub(crate) async fn is_current(&self, fired: &FiredJob) -> Result<bool, LifecycleError> {
        let key = fired.key;
        Ok(self
            .jobs
            .find(key.discussion_id, key.stage)
            .await?
            .is_some_and(|record| record.fire_at == fired.fire_at))
    }

    /// Drop the record of a job that has fired.
    ///
    /// The record is kept if it was rescheduled after the timer was armed.
    pub(crate) async fn complete_job(&self, fired: &FiredJob) -> Result<bool, LifecycleError> {
        let key = fired.key;
        match self.jobs.find(key.discussion_id, key.stage).await? {
            Some(record) if record.fire_at == fired.fire_at => {
                Ok(self.jobs.delete(key.discussion_id, key.stage).await?)
            }
            Some(record) => {
                debug!(
                    "Keeping record {}: moved to {} after firing at {}",
                    key, record.fire_at, fired.fire_at
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
