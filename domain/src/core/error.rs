//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Unknown discussion status: {0}")]
    UnknownStatus(String),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Unknown value '{value}' for {field}")]
    UnknownValue { field: &'static str, value: String },
}

impl DomainError {
    /// Check if this error rejects a lifecycle move rather than malformed data
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, DomainError::InvalidTransition(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_schedule_display() {
        let error = DomainError::InvalidSchedule("start is in the past".to_string());
        assert_eq!(error.to_string(), "Invalid schedule: start is in the past");
    }

    #[test]
    fn test_is_invalid_transition_check() {
        assert!(DomainError::InvalidTransition("x".to_string()).is_invalid_transition());
        assert!(!DomainError::UnknownStatus("x".to_string()).is_invalid_transition());
        assert!(!DomainError::UnknownStage("x".to_string()).is_invalid_transition());
    }
}
