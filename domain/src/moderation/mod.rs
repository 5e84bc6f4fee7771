//! Moderation domain
//!
//! Reports accumulate against a discussion or a comment. Once enough are
//! pending, the target is blocked. Blocking is final.

pub mod report;
pub mod rule;

pub use report::{NewReport, Report, ReportStatus, ReportTarget};
pub use rule::{ModerationRule, ModerationVerdict};
