//! Schedule restore use case
//!
//! Runs once at boot, before the orchestrator accepts registrations. Every
//! live discussion gets its recorded jobs re-armed for the stages it has not
//! reached yet; records for stages already passed, and records of discussions
//! that are deleted or terminal, are removed. Past-due jobs fire immediately
//! once armed.

use crate::ports::lifecycle_event_log::{LifecycleEvent, LifecycleEventLog, NoLifecycleEventLog};
use crate::ports::repositories::{DiscussionRepository, ScheduledJobStore};
use crate::use_cases::error::LifecycleError;
use crate::use_cases::orchestrator::LifecycleOrchestrator;
use debate_domain::{DiscussionId, ScheduledJob, Stage};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a restore pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Live discussions inspected
    pub discussions: usize,
    pub rearmed: usize,
    /// Records for stages the discussion has already passed
    pub stale_removed: usize,
    /// Records whose discussion is deleted, terminal or gone
    pub orphaned_removed: usize,
    /// Remaining stages with no record, typically after a failed gate
    pub unrecorded: usize,
}

pub struct RestoreScheduleUseCase {
    discussions: Arc<dyn DiscussionRepository>,
    jobs: Arc<dyn ScheduledJobStore>,
    orchestrator: Arc<LifecycleOrchestrator>,
    events: Arc<dyn LifecycleEventLog>,
}

impl RestoreScheduleUseCase {
    pub fn new(
        discussions: Arc<dyn DiscussionRepository>,
        jobs: Arc<dyn ScheduledJobStore>,
        orchestrator: Arc<LifecycleOrchestrator>,
    ) -> Self {
        Self {
            discussions,
            jobs,
            orchestrator,
            events: Arc::new(NoLifecycleEventLog),
        }
    }

    pub fn with_event_log(mut self, events: Arc<dyn LifecycleEventLog>) -> Self {
        self.events = events;
        self
    }

    pub async fn execute(&self) -> Result<RestoreReport, LifecycleError> {
        let mut report = RestoreReport::default();

        let mut recorded: HashMap<DiscussionId, Vec<ScheduledJob>> = HashMap::new();
        for job in self.jobs.list_all().await? {
            recorded.entry(job.discussion_id).or_default().push(job);
        }

        let live = self.discussions.list_live().await?;
        report.discussions = live.len();

        for discussion in &live {
            let remaining = Stage::remaining_after(discussion.status);
            let records = recorded.remove(&discussion.id).unwrap_or_default();

            report.unrecorded += remaining
                .iter()
                .filter(|stage| !records.iter().any(|job| job.stage == **stage))
                .count();

            for job in records {
                if remaining.contains(&job.stage) {
                    self.orchestrator.rearm(&job)?;
                    debug!("Re-armed {} at {}", job.key(), job.fire_at);
                    report.rearmed += 1;
                } else {
                    self.jobs.delete(job.discussion_id, job.stage).await?;
                    report.stale_removed += 1;
                }
            }
        }

        for (discussion_id, records) in recorded {
            warn!(
                "Removing {} records of discussion {}, which is no longer live",
                records.len(),
                discussion_id
            );
            report.orphaned_removed += self.jobs.delete_all(discussion_id).await?;
        }

        self.orchestrator.mark_ready();

        info!(
            "Restored schedule: {} jobs re-armed for {} discussions ({} stale, {} orphaned removed)",
            report.rearmed, report.discussions, report.stale_removed, report.orphaned_removed
        );
        self.events.record(LifecycleEvent::new(
            "schedule_restored",
            json!(report),
        ));

        Ok(report)
    }
}
