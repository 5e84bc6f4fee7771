//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain policies by
//! [`FileConfig::to_lifecycle_config`].

mod analysis;
mod lifecycle;
mod output;
mod storage;

pub use analysis::FileAnalysisConfig;
pub use lifecycle::{FileLifecycleConfig, FileModerationConfig};
pub use output::FileOutputConfig;
pub use storage::{FileLoggingConfig, FileStorageConfig};

use debate_application::LifecycleConfig;
use debate_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Stage offsets and quorum thresholds
    pub lifecycle: FileLifecycleConfig,
    /// Report threshold
    pub moderation: FileModerationConfig,
    /// SQLite database location
    pub storage: FileStorageConfig,
    /// Remote analysis service
    pub analysis: FileAnalysisConfig,
    /// Structured event log
    pub logging: FileLoggingConfig,
    /// Console output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Build the policies the use cases consume.
    pub fn to_lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig::new(
            self.lifecycle.to_timeline(),
            self.lifecycle.to_quorum(),
            self.moderation.to_rule(),
        )
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Timeline ordering and zero thresholds
    /// 2. Empty path and URL fields
    /// 3. Analysis timeout
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.to_lifecycle_config().validate();
        issues.extend(self.storage.validate());
        issues.extend(self.logging.validate());
        issues.extend(self.analysis.validate());
        issues
    }
}
