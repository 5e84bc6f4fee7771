//! Use case error type

use crate::ports::directory::LookupError;
use crate::ports::repositories::RepositoryError;
use crate::ports::timer_engine::SchedulingError;
use debate_domain::{DiscussionId, DomainError};
use thiserror::Error;

/// Errors surfaced by the lifecycle use cases
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Scheduling failure: {0}")]
    SchedulingFailure(String),

    #[error("Concurrent update on discussion {0} lost after retry")]
    TransitionRace(DiscussionId),

    #[error("Duplicate {0}")]
    Duplicate(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl LifecycleError {
    pub fn discussion_not_found(id: DiscussionId) -> Self {
        LifecycleError::NotFound {
            entity: "discussion",
            id: id.get(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LifecycleError::NotFound { .. })
    }

    /// Storage failures on the schedule are scheduling failures, whatever the store says.
    pub(crate) fn scheduling(err: impl std::fmt::Display) -> Self {
        LifecycleError::SchedulingFailure(err.to_string())
    }
}

impl From<RepositoryError> for LifecycleError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => LifecycleError::NotFound { entity, id },
            RepositoryError::VersionConflict { id, .. } => LifecycleError::TransitionRace(id),
            RepositoryError::Duplicate(what) => LifecycleError::Duplicate(what),
            RepositoryError::Storage(msg) => LifecycleError::Storage(msg),
        }
    }
}

impl From<SchedulingError> for LifecycleError {
    fn from(err: SchedulingError) -> Self {
        LifecycleError::SchedulingFailure(err.to_string())
    }
}

impl From<LookupError> for LifecycleError {
    fn from(err: LookupError) -> Self {
        LifecycleError::Lookup(err.to_string())
    }
}
