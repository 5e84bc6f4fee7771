//! Analysis gateway port
//!
//! Reads a closed debate and produces its conclusion. Implementations may be
//! slow; callers always run them on a detached task.

use async_trait::async_trait;
use debate_domain::{AnalysisOutcome, DiscussionId};
use thiserror::Error;

/// Errors that can occur while requesting an analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis service not configured")]
    NotConfigured,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze(&self, discussion_id: DiscussionId) -> Result<AnalysisOutcome, AnalysisError>;
}

/// Gateway used when no analysis service is configured. Every call fails,
/// which the lifecycle logs and moves past.
pub struct UnconfiguredAnalysis;

#[async_trait]
impl AnalysisGateway for UnconfiguredAnalysis {
    async fn analyze(&self, _discussion_id: DiscussionId) -> Result<AnalysisOutcome, AnalysisError> {
        Err(AnalysisError::NotConfigured)
    }
}
