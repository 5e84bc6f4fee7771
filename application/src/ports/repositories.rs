//! Repository ports
//!
//! Each trait covers one table of the durable state. Implementations must make
//! every method atomic on its own; methods that touch several rows (comment
//! insertion with its order shift, bulk report acceptance, participant
//! replacement) run inside a single storage transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use debate_domain::{
    AnalysisOutcome, Comment, CommentDraft, CommentId, CommentStatus, Discussion, DiscussionId,
    DiscussionStatus, MemberId, NewDiscussion, NewReport, Participant, Report, ReportTarget,
    ScheduledJob, Stage, Tally, VoteType,
};
use thiserror::Error;

/// Errors that can occur during repository operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Version conflict on discussion {id}: expected {expected}")]
    VersionConflict { id: DiscussionId, expected: i64 },

    #[error("Duplicate {0}")]
    Duplicate(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn discussion_not_found(id: DiscussionId) -> Self {
        RepositoryError::NotFound {
            entity: "discussion",
            id: id.get(),
        }
    }

    pub fn comment_not_found(id: CommentId) -> Self {
        RepositoryError::NotFound {
            entity: "comment",
            id: id.get(),
        }
    }

    pub fn is_version_conflict(&self) -> bool {
        matches!(self, RepositoryError::VersionConflict { .. })
    }
}

/// Discussion rows. Status, detail and delete writes are version checked.
#[async_trait]
pub trait DiscussionRepository: Send + Sync {
    async fn insert(
        &self,
        new: &NewDiscussion,
        now: DateTime<Utc>,
    ) -> Result<Discussion, RepositoryError>;

    async fn find(&self, id: DiscussionId) -> Result<Option<Discussion>, RepositoryError>;

    /// Non-deleted discussions whose status is not terminal.
    async fn list_live(&self) -> Result<Vec<Discussion>, RepositoryError>;

    /// Set `status` if the stored version still equals `expected_version`.
    async fn update_status(
        &self,
        id: DiscussionId,
        status: DiscussionStatus,
        expected_version: i64,
    ) -> Result<Discussion, RepositoryError>;

    /// Persist title, content, start date and closed-at of `edited`.
    async fn update_details(
        &self,
        edited: &Discussion,
        expected_version: i64,
    ) -> Result<Discussion, RepositoryError>;

    async fn soft_delete(
        &self,
        id: DiscussionId,
        at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<Discussion, RepositoryError>;

    async fn increment_views(&self, id: DiscussionId) -> Result<(), RepositoryError>;

    /// Store the analysis outcome. Returns `false` if one was already stored.
    async fn record_analysis(
        &self,
        id: DiscussionId,
        outcome: &AnalysisOutcome,
    ) -> Result<bool, RepositoryError>;
}

/// Participant rows, unique on (discussion, member).
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn find(
        &self,
        discussion_id: DiscussionId,
        member_id: MemberId,
    ) -> Result<Option<Participant>, RepositoryError>;

    async fn insert(&self, participant: &Participant) -> Result<(), RepositoryError>;

    /// Delete the member's row and insert `participant` in its place.
    async fn replace(&self, participant: &Participant) -> Result<(), RepositoryError>;

    async fn delete(
        &self,
        discussion_id: DiscussionId,
        member_id: MemberId,
    ) -> Result<bool, RepositoryError>;

    async fn tally(&self, discussion_id: DiscussionId) -> Result<Tally, RepositoryError>;
}

/// Comment rows with their thread positions.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Place and insert a comment according to [`debate_domain::plan_placement`].
    async fn insert(
        &self,
        draft: &CommentDraft,
        now: DateTime<Utc>,
    ) -> Result<Comment, RepositoryError>;

    async fn find(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError>;

    /// All comments of a discussion ordered by `total_order`, deleted ones included.
    async fn list_thread(
        &self,
        discussion_id: DiscussionId,
    ) -> Result<Vec<Comment>, RepositoryError>;

    async fn soft_delete(&self, id: CommentId) -> Result<(), RepositoryError>;

    async fn set_status(
        &self,
        id: CommentId,
        status: CommentStatus,
    ) -> Result<(), RepositoryError>;

    /// Non-deleted comments by `author` with vote type `vote`.
    async fn count_by_author_vote(
        &self,
        discussion_id: DiscussionId,
        author: MemberId,
        vote: VoteType,
    ) -> Result<usize, RepositoryError>;
}

/// Moderation reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Fails with [`RepositoryError::Duplicate`] if the reporter already has a
    /// pending report against the same target.
    async fn insert(
        &self,
        report: &NewReport,
        now: DateTime<Utc>,
    ) -> Result<Report, RepositoryError>;

    async fn count_pending(&self, target: ReportTarget) -> Result<usize, RepositoryError>;

    /// Move every pending report against `target` to `AcceptedPendingReview`.
    async fn accept_pending(&self, target: ReportTarget) -> Result<usize, RepositoryError>;
}

/// Durable schedule: one record per pending (discussion, stage).
#[async_trait]
pub trait ScheduledJobStore: Send + Sync {
    /// Insert or overwrite the records for these keys.
    async fn upsert_all(&self, jobs: &[ScheduledJob]) -> Result<(), RepositoryError>;

    async fn find(
        &self,
        discussion_id: DiscussionId,
        stage: Stage,
    ) -> Result<Option<ScheduledJob>, RepositoryError>;

    async fn list_for(
        &self,
        discussion_id: DiscussionId,
    ) -> Result<Vec<ScheduledJob>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<ScheduledJob>, RepositoryError>;

    /// Change fire times of records that still exist; returns the updated records.
    async fn update_fire_times(
        &self,
        discussion_id: DiscussionId,
        fire_times: &[(Stage, DateTime<Utc>)],
    ) -> Result<Vec<ScheduledJob>, RepositoryError>;

    async fn delete(
        &self,
        discussion_id: DiscussionId,
        stage: Stage,
    ) -> Result<bool, RepositoryError>;

    async fn delete_all(&self, discussion_id: DiscussionId) -> Result<usize, RepositoryError>;
}
