//! Configuration file loading for book-debate
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DEBATE_*` environment variables (`DEBATE_LIFECYCLE__MIN_AGREE=3`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./debate.toml` or `./.debate.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/book-debate/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAnalysisConfig, FileConfig, FileLifecycleConfig, FileLoggingConfig,
    FileModerationConfig, FileOutputConfig, FileStorageConfig,
};
pub use loader::ConfigLoader;
