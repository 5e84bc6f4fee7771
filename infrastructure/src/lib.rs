//! Infrastructure layer for book-debate
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: SQLite persistence, the tokio timer engine, the JSONL
//! lifecycle event log, configuration file loading and (behind the
//! `http-analysis` feature) the remote analysis gateway.

#[cfg(feature = "http-analysis")]
pub mod analysis;
pub mod config;
pub mod logging;
pub mod persistence;
pub mod scheduler;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
#[cfg(feature = "http-analysis")]
pub use analysis::HttpAnalysisGateway;
pub use config::{
    ConfigLoader, FileAnalysisConfig, FileConfig, FileLifecycleConfig, FileLoggingConfig,
    FileModerationConfig, FileOutputConfig, FileStorageConfig,
};
pub use logging::JsonlLifecycleEventLog;
pub use persistence::{SqliteStore, StoreError};
pub use scheduler::TokioTimerEngine;
