//! Timeline policy: when each stage fires relative to the start date

use super::stage::Stage;
use crate::core::error::DomainError;
use chrono::{DateTime, Duration, Utc};

/// Fire-time offsets for the four stages.
///
/// | Stage | Fires at |
/// |-------|----------|
/// | `Scheduled` | `start - gate_lead` |
/// | `InProgress` | `start` |
/// | `Analyzing` | `start + analysis_after` |
/// | `Completed` | `start + completion_after` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelinePolicy {
    pub gate_lead: Duration,
    pub analysis_after: Duration,
    pub completion_after: Duration,
}

impl Default for TimelinePolicy {
    fn default() -> Self {
        Self {
            gate_lead: Duration::minutes(2),
            analysis_after: Duration::days(1),
            completion_after: Duration::days(1) + Duration::minutes(10),
        }
    }
}

impl TimelinePolicy {
    pub fn with_gate_lead(mut self, lead: Duration) -> Self {
        self.gate_lead = lead;
        self
    }

    pub fn with_analysis_after(mut self, after: Duration) -> Self {
        self.analysis_after = after;
        self
    }

    pub fn with_completion_after(mut self, after: Duration) -> Self {
        self.completion_after = after;
        self
    }

    pub fn fire_time(&self, stage: Stage, start: DateTime<Utc>) -> DateTime<Utc> {
        match stage {
            Stage::Scheduled => start - self.gate_lead,
            Stage::InProgress => start,
            Stage::Analyzing => start + self.analysis_after,
            Stage::Completed => start + self.completion_after,
        }
    }

    /// All four stages with their fire times, in firing order.
    pub fn timeline(&self, start: DateTime<Utc>) -> Vec<(Stage, DateTime<Utc>)> {
        Stage::ALL
            .into_iter()
            .map(|stage| (stage, self.fire_time(stage, start)))
            .collect()
    }

    /// Offsets must keep the stages in firing order.
    pub fn is_monotonic(&self) -> bool {
        self.gate_lead > Duration::zero()
            && self.analysis_after > Duration::zero()
            && self.completion_after > self.analysis_after
    }

    /// A start date is acceptable when the gate still lies in the future.
    pub fn validate_start(
        &self,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let gate = self.fire_time(Stage::Scheduled, start);
        if gate <= now {
            return Err(DomainError::InvalidSchedule(format!(
                "start {} leaves no time for the quorum check (gate at {}, now {})",
                start.to_rfc3339(),
                gate.to_rfc3339(),
                now.to_rfc3339()
            )));
        }
        Ok(())
    }
}
