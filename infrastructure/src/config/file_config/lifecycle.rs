//! Lifecycle configuration from TOML (`[lifecycle]` and `[moderation]` sections)
//!
//! Example configuration:
//!
//! ```toml
//! [lifecycle]
//! gate_lead_minutes = 2            # quorum check before the start
//! analysis_after_minutes = 1440    # debate length
//! completion_after_minutes = 1450  # measured from the start
//! min_agree = 2
//! min_disagree = 2
//!
//! [moderation]
//! report_threshold = 3
//! ```

use chrono::Duration;
use debate_domain::{ModerationRule, QuorumRule, TimelinePolicy};
use serde::{Deserialize, Serialize};

/// Stage offsets in minutes plus the quorum thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLifecycleConfig {
    pub gate_lead_minutes: u32,
    pub analysis_after_minutes: u32,
    pub completion_after_minutes: u32,
    pub min_agree: usize,
    pub min_disagree: usize,
}

impl Default for FileLifecycleConfig {
    fn default() -> Self {
        let timeline = TimelinePolicy::default();
        let quorum = QuorumRule::default();
        Self {
            gate_lead_minutes: whole_minutes(timeline.gate_lead),
            analysis_after_minutes: whole_minutes(timeline.analysis_after),
            completion_after_minutes: whole_minutes(timeline.completion_after),
            min_agree: quorum.min_agree,
            min_disagree: quorum.min_disagree,
        }
    }
}

impl FileLifecycleConfig {
    pub fn to_timeline(&self) -> TimelinePolicy {
        TimelinePolicy::default()
            .with_gate_lead(Duration::minutes(i64::from(self.gate_lead_minutes)))
            .with_analysis_after(Duration::minutes(i64::from(self.analysis_after_minutes)))
            .with_completion_after(Duration::minutes(i64::from(
                self.completion_after_minutes,
            )))
    }

    pub fn to_quorum(&self) -> QuorumRule {
        QuorumRule::new(self.min_agree, self.min_disagree)
    }
}

fn whole_minutes(duration: Duration) -> u32 {
    u32::try_from(duration.num_minutes()).unwrap_or(0)
}

/// Raw moderation configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModerationConfig {
    /// Pending reports needed to block a target
    pub report_threshold: usize,
}

impl Default for FileModerationConfig {
    fn default() -> Self {
        Self {
            report_threshold: ModerationRule::default().threshold,
        }
    }
}

impl FileModerationConfig {
    pub fn to_rule(&self) -> ModerationRule {
        ModerationRule::new(self.report_threshold)
    }
}
