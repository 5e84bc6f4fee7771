//! Application layer for book-debate
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::LifecycleConfig;
pub use ports::{
    analysis_gateway::{AnalysisError, AnalysisGateway, UnconfiguredAnalysis},
    clock::{Clock, SystemClock},
    directory::{BookCatalog, LookupError, MemberDirectory, OpenDirectory},
    lifecycle_event_log::{LifecycleEvent, LifecycleEventLog, NoLifecycleEventLog},
    repositories::{
        CommentRepository, DiscussionRepository, ParticipantRepository, ReportRepository,
        RepositoryError, ScheduledJobStore,
    },
    timer_engine::{FiredJob, SchedulingError, TimerEngine},
};
pub use use_cases::analysis::AnalysisRunner;
pub use use_cases::comment_thread::CommentThreadUseCase;
pub use use_cases::dispatcher::JobDispatcher;
pub use use_cases::error::LifecycleError;
pub use use_cases::manage_discussion::{DiscussionSummary, ManageDiscussionUseCase};
pub use use_cases::moderation::{ModerationOutcome, ModerationUseCase};
pub use use_cases::orchestrator::LifecycleOrchestrator;
pub use use_cases::restore::{RestoreReport, RestoreScheduleUseCase};
pub use use_cases::transition::{TransitionOutcome, TransitionUseCase};
pub use use_cases::vote_ledger::VoteLedger;
