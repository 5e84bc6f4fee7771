//! Timer engine port
//!
//! The in-memory half of the scheduler. The durable half is
//! [`ScheduledJobStore`](super::repositories::ScheduledJobStore); the engine
//! only holds what is currently armed and is rebuilt from the store at boot.

use chrono::{DateTime, Utc};
use debate_domain::{DiscussionId, JobKey, ScheduledJob};
use thiserror::Error;

/// Errors that can occur while arming or disarming timers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Timer engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Timer engine is shut down")]
    EngineClosed,

    #[error("Scheduler not ready: pending jobs have not been restored yet")]
    NotReady,
}

/// A timer that reached its fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredJob {
    pub key: JobKey,
    /// The fire time the timer was armed with
    pub fire_at: DateTime<Utc>,
}

/// In-memory timers keyed by (discussion, stage).
///
/// Arming a key that is already armed replaces the earlier timer, so at most
/// one timer per key is ever pending. Fire times in the past fire immediately.
pub trait TimerEngine: Send + Sync {
    fn arm(&self, job: &ScheduledJob) -> Result<(), SchedulingError>;

    /// Returns `true` if a timer was armed for `key`.
    fn disarm(&self, key: JobKey) -> bool;

    /// Disarm every timer of a discussion, returning how many were armed.
    fn disarm_all(&self, discussion_id: DiscussionId) -> usize;

    fn armed_count(&self) -> usize;
}
