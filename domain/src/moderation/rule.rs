//! Report threshold rule

use serde::{Deserialize, Serialize};

/// Number of pending reports that blocks a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationRule {
    pub threshold: usize,
}

impl Default for ModerationRule {
    fn default() -> Self {
        Self { threshold: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationVerdict {
    BelowThreshold { pending: usize },
    Block { pending: usize },
}

impl ModerationRule {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn verdict(&self, pending: usize) -> ModerationVerdict {
        if pending >= self.threshold {
            ModerationVerdict::Block { pending }
        } else {
            ModerationVerdict::BelowThreshold { pending }
        }
    }
}
