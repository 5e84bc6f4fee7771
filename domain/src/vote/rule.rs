//! Quorum rule for the scheduling gate
//!
//! A debate only makes sense with people on both sides, so the gate demands a
//! minimum number of participants per side rather than a share of the total.

use super::ballot::Tally;
use serde::{Deserialize, Serialize};

/// Minimum participants per side required to schedule a discussion.
///
/// # Example
///
/// ```
/// use debate_domain::vote::{QuorumRule, Tally};
///
/// let rule = QuorumRule::default();
/// assert!(rule.is_satisfied(&Tally::new(2, 2)));
/// assert!(!rule.is_satisfied(&Tally::new(5, 1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumRule {
    pub min_agree: usize,
    pub min_disagree: usize,
}

impl Default for QuorumRule {
    fn default() -> Self {
        Self {
            min_agree: 2,
            min_disagree: 2,
        }
    }
}

impl QuorumRule {
    pub fn new(min_agree: usize, min_disagree: usize) -> Self {
        Self {
            min_agree,
            min_disagree,
        }
    }

    /// Both sides must reach their minimum.
    pub fn is_satisfied(&self, tally: &Tally) -> bool {
        tally.agree >= self.min_agree && tally.disagree >= self.min_disagree
    }

    /// Participants still missing on each side, as (agree, disagree).
    pub fn shortfall(&self, tally: &Tally) -> (usize, usize) {
        (
            self.min_agree.saturating_sub(tally.agree),
            self.min_disagree.saturating_sub(tally.disagree),
        )
    }

    pub fn description(&self) -> String {
        format!(
            "at least {} agree and {} disagree",
            self.min_agree, self.min_disagree
        )
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
