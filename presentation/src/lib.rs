//! Presentation layer for book-debate
//!
//! This crate contains the CLI definition and console output formatting.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, Stance, VoteArg, report_target};
pub use output::console::ConsoleFormatter;
