//! Analysis result value objects
//!
//! The analysis collaborator reads a finished debate and returns a verdict.
//! The core only stores it; it never interprets the text fields.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Which side the analysis judged stronger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Agree,
    Disagree,
    Undecided,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Agree => "AGREE",
            Verdict::Disagree => "DISAGREE",
            Verdict::Undecided => "UNDECIDED",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Verdict {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AGREE" => Ok(Verdict::Agree),
            "DISAGREE" => Ok(Verdict::Disagree),
            "UNDECIDED" => Ok(Verdict::Undecided),
            _ => Err(DomainError::UnknownValue {
                field: "verdict",
                value: s.to_string(),
            }),
        }
    }
}

/// Conclusion, verdict and split produced for a completed debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub conclusion: String,
    pub result: Verdict,
    pub agree_percent: u8,
    pub disagree_percent: u8,
    pub reasoning: String,
}

impl AnalysisOutcome {
    /// An outcome with the percentages clamped to 0..=100.
    pub fn new(
        conclusion: impl Into<String>,
        result: Verdict,
        agree_percent: u8,
        disagree_percent: u8,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            conclusion: conclusion.into(),
            result,
            agree_percent: agree_percent.min(100),
            disagree_percent: disagree_percent.min(100),
            reasoning: reasoning.into(),
        }
    }
}
