//! Discussion aggregate.
//!
//! - [`status::DiscussionStatus`]: lifecycle position of a discussion
//! - [`entities::Discussion`]: the persisted discussion row
//! - [`analysis::AnalysisOutcome`]: result written back by the analysis collaborator

pub mod analysis;
pub mod entities;
pub mod status;
