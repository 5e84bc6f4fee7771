//! Lifecycle configuration container.
//!
//! Groups the three domain policies the use cases need. Use cases receive only
//! the slice they consume; the binary builds the container once from the
//! config file.

use debate_domain::{ConfigIssue, ConfigIssueCode, ModerationRule, QuorumRule, TimelinePolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleConfig {
    pub timeline: TimelinePolicy,
    pub quorum: QuorumRule,
    pub moderation: ModerationRule,
}

impl LifecycleConfig {
    pub fn new(timeline: TimelinePolicy, quorum: QuorumRule, moderation: ModerationRule) -> Self {
        Self {
            timeline,
            quorum,
            moderation,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_timeline(mut self, timeline: TimelinePolicy) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn with_quorum(mut self, quorum: QuorumRule) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn with_moderation(mut self, moderation: ModerationRule) -> Self {
        self.moderation = moderation;
        self
    }

    /// Detect combinations that would break the lifecycle.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !self.timeline.is_monotonic() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NonMonotonicTimeline,
                "lifecycle: stages must fire in order (gate lead > 0, analysis > 0, completion after analysis)",
            ));
        }

        for (field, value) in [
            ("lifecycle.min_agree", self.quorum.min_agree),
            ("lifecycle.min_disagree", self.quorum.min_disagree),
            ("moderation.report_threshold", self.moderation.threshold),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::ZeroThreshold {
                        field: field.to_string(),
                    },
                    format!("{field}: 0 disables this check"),
                ));
            }
        }

        issues
    }
}
