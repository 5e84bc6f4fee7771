//! Durable scheduled job record
//!
//! One record exists per pending (discussion, stage). The naming scheme keeps
//! job and trigger identities stable, so a record written before a restart is
//! recognisable afterwards.

use super::stage::Stage;
use crate::core::ids::DiscussionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const JOB_GROUP: &str = "discussion-lifecycle";
pub const TRIGGER_GROUP: &str = "discussion-lifecycle-triggers";

/// Identity of a pending stage job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    pub discussion_id: DiscussionId,
    pub stage: Stage,
}

impl JobKey {
    pub fn new(discussion_id: DiscussionId, stage: Stage) -> Self {
        Self {
            discussion_id,
            stage,
        }
    }

    pub fn job_name(&self) -> String {
        format!("discussion-{}-{}", self.discussion_id, self.stage)
    }

    pub fn trigger_name(&self) -> String {
        format!("trigger-{}-{}", self.discussion_id, self.stage)
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.discussion_id, self.stage)
    }
}

/// "At `fire_at`, fire `stage` for `discussion_id`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub discussion_id: DiscussionId,
    pub stage: Stage,
    pub job_name: String,
    pub job_group: String,
    /// Stage identifier the job fires
    pub target: String,
    pub trigger_name: String,
    pub trigger_group: String,
    pub fire_at: DateTime<Utc>,
}

impl ScheduledJob {
    pub fn new(discussion_id: DiscussionId, stage: Stage, fire_at: DateTime<Utc>) -> Self {
        let key = JobKey::new(discussion_id, stage);
        Self {
            discussion_id,
            stage,
            job_name: key.job_name(),
            job_group: JOB_GROUP.to_string(),
            target: stage.as_str().to_string(),
            trigger_name: key.trigger_name(),
            trigger_group: TRIGGER_GROUP.to_string(),
            fire_at,
        }
    }

    pub fn key(&self) -> JobKey {
        JobKey::new(self.discussion_id, self.stage)
    }

    pub fn rescheduled(&self, fire_at: DateTime<Utc>) -> Self {
        Self {
            fire_at,
            ..self.clone()
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.fire_at <= now
    }
}
