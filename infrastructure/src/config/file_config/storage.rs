//! Storage and event log locations (`[storage]` and `[logging]` sections)

use debate_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DATABASE_FILE: &str = "debate.db";

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// SQLite database path; defaults under the user data directory
    pub database: Option<PathBuf>,
}

impl FileStorageConfig {
    /// The configured database path, or `$XDG_DATA_HOME/book-debate/debate.db`.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database {
            return path.clone();
        }
        dirs::data_dir()
            .map(|d| d.join("book-debate").join(DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        empty_path("storage.database", self.database.as_deref())
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL lifecycle event log; disabled when unset
    pub event_log: Option<PathBuf>,
    /// Directory for daily rolling diagnostic logs; stderr only when unset
    pub directory: Option<PathBuf>,
}

impl FileLoggingConfig {
    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = empty_path("logging.event_log", self.event_log.as_deref());
        issues.extend(empty_path("logging.directory", self.directory.as_deref()));
        issues
    }
}

fn empty_path(field: &str, path: Option<&Path>) -> Vec<ConfigIssue> {
    match path {
        Some(path) if path.as_os_str().is_empty() => vec![ConfigIssue::error(
            ConfigIssueCode::EmptyValue {
                field: field.to_string(),
            },
            format!("{field}: path cannot be empty"),
        )],
        _ => Vec::new(),
    }
}
