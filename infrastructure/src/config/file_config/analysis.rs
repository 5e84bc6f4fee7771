//! Analysis service configuration from TOML (`[analysis]` section)
//!
//! ```toml
//! [analysis]
//! endpoint = "http://localhost:8000/analyze"
//! timeout_secs = 60
//! ```

use debate_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw analysis configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnalysisConfig {
    /// Base URL of the analysis service; analysis is skipped when unset
    pub endpoint: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FileAnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 60,
        }
    }
}

impl FileAnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The endpoint, ignoring blank values.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.endpoint.is_some() && self.endpoint().is_none() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyValue {
                    field: "analysis.endpoint".to_string(),
                },
                "analysis.endpoint: empty, analysis will be skipped",
            ));
        }

        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroThreshold {
                    field: "analysis.timeout_secs".to_string(),
                },
                "analysis.timeout_secs: must be at least 1",
            ));
        }

        issues
    }
}
