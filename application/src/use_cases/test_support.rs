//! In-memory ports and a wired harness for use case tests

use crate::ports::analysis_gateway::{AnalysisError, AnalysisGateway};
use crate::ports::clock::Clock;
use crate::ports::directory::{BookCatalog, LookupError, MemberDirectory, OpenDirectory};
use crate::ports::lifecycle_event_log::{LifecycleEvent, LifecycleEventLog};
use crate::ports::repositories::*;
use crate::ports::timer_engine::{SchedulingError, TimerEngine};
use crate::use_cases::analysis::AnalysisRunner;
use crate::use_cases::comment_thread::CommentThreadUseCase;
use crate::use_cases::dispatcher::JobDispatcher;
use crate::use_cases::manage_discussion::ManageDiscussionUseCase;
use crate::use_cases::moderation::ModerationUseCase;
use crate::use_cases::orchestrator::LifecycleOrchestrator;
use crate::use_cases::restore::RestoreScheduleUseCase;
use crate::use_cases::transition::TransitionUseCase;
use crate::use_cases::vote_ledger::VoteLedger;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use debate_domain::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub(crate) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap()
}

pub(crate) fn now() -> DateTime<Utc> {
    start() - Duration::days(1)
}

// ==================== MemoryStore ====================

#[derive(Default)]
struct State {
    discussions: BTreeMap<DiscussionId, Discussion>,
    participants: BTreeMap<(DiscussionId, MemberId), Participant>,
    comments: BTreeMap<CommentId, Comment>,
    reports: Vec<Report>,
    jobs: BTreeMap<JobKey, ScheduledJob>,
    next_id: i64,
    max_group_id: i64,
    conflicts: usize,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn discussion_mut(&mut self, id: DiscussionId) -> Result<&mut Discussion, RepositoryError> {
        self.discussions
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::discussion_not_found(id))
    }

    fn checked_mut(
        &mut self,
        id: DiscussionId,
        expected: i64,
    ) -> Result<&mut Discussion, RepositoryError> {
        let injected = self.conflicts > 0;
        if injected {
            self.conflicts -= 1;
        }
        let discussion = self.discussion_mut(id)?;
        if injected {
            discussion.version += 1;
        }
        if injected || discussion.version != expected {
            return Err(RepositoryError::VersionConflict { id, expected });
        }
        discussion.version += 1;
        Ok(discussion)
    }

    fn place(&mut self, draft: &CommentDraft, now: DateTime<Utc>) -> Result<Comment, RepositoryError> {
        let parent_group = match draft.parent_id {
            Some(parent) => Some(
                self.comments
                    .get(&parent)
                    .map(|c| c.group_id)
                    .ok_or_else(|| RepositoryError::comment_not_found(parent))?,
            ),
            None => None,
        };

        let ids: Vec<CommentId> = self
            .comments
            .values()
            .filter(|c| c.discussion_id == draft.discussion_id)
            .map(|c| c.id)
            .collect();
        let mut rows: Vec<(i64, i64, i64)> = ids
            .iter()
            .map(|id| {
                let c = &self.comments[id];
                (c.group_id, c.group_order, c.total_order)
            })
            .collect();

        let placement = place_into(&mut rows, parent_group, self.max_group_id);
        for (id, row) in ids.iter().zip(rows.iter()) {
            if let Some(c) = self.comments.get_mut(id) {
                c.total_order = row.2;
            }
        }
        self.max_group_id = self.max_group_id.max(placement.group_id);

        let comment = Comment {
            id: CommentId(self.next_id()),
            discussion_id: draft.discussion_id,
            author: draft.author,
            parent_id: draft.parent_id,
            group_id: placement.group_id,
            group_order: placement.group_order,
            total_order: placement.total_order,
            vote: draft.vote,
            status: CommentStatus::Active,
            content: draft.content.clone(),
            deleted: false,
            created_at: now,
        };
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }
}

pub(crate) struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn seed_discussion(&self, status: DiscussionStatus, start: DateTime<Utc>) -> DiscussionId {
        let mut state = self.state();
        let id = DiscussionId(state.next_id());
        state.discussions.insert(
            id,
            Discussion {
                id,
                owner: MemberId(10),
                book: BookId(100),
                title: format!("Discussion {}", id),
                content: "Discuss.".to_string(),
                status,
                start_date: start,
                closed_at: start + debate_length(),
                views: 0,
                analysis: None,
                version: 1,
                deleted: false,
                deleted_at: None,
                created_at: now(),
            },
        );
        id
    }

    pub fn seed_timeline(&self, id: DiscussionId, start: DateTime<Utc>, policy: &TimelinePolicy) {
        let mut state = self.state();
        for (stage, fire_at) in policy.timeline(start) {
            let job = ScheduledJob::new(id, stage, fire_at);
            state.jobs.insert(job.key(), job);
        }
    }

    pub fn mark_deleted(&self, id: DiscussionId) {
        if let Some(d) = self.state().discussions.get_mut(&id) {
            d.deleted = true;
            d.deleted_at = Some(now());
        }
    }

    pub fn discussion(&self, id: DiscussionId) -> Option<Discussion> {
        self.state().discussions.get(&id).cloned()
    }

    pub fn inject_conflicts(&self, count: usize) {
        self.state().conflicts = count;
    }

    pub fn job(&self, key: JobKey) -> Option<ScheduledJob> {
        self.state().jobs.get(&key).cloned()
    }

    pub fn jobs_for(&self, id: DiscussionId) -> Vec<ScheduledJob> {
        self.state()
            .jobs
            .values()
            .filter(|j| j.discussion_id == id)
            .cloned()
            .collect()
    }

    pub fn job_count(&self) -> usize {
        self.state().jobs.len()
    }

    pub fn drop_job(&self, key: JobKey) {
        self.state().jobs.remove(&key);
    }

    pub fn add_comment(&self, draft: CommentDraft) -> Comment {
        self.state().place(&draft, now()).unwrap()
    }

    pub fn remove_comment(&self, id: CommentId) {
        if let Some(c) = self.state().comments.get_mut(&id) {
            c.deleted = true;
        }
    }

    pub fn pending_reports(&self, target: ReportTarget) -> usize {
        self.state()
            .reports
            .iter()
            .filter(|r| r.target == target && r.status == ReportStatus::Pending)
            .count()
    }
}

#[async_trait]
impl DiscussionRepository for MemoryStore {
    async fn insert(
        &self,
        new: &NewDiscussion,
        now: DateTime<Utc>,
    ) -> Result<Discussion, RepositoryError> {
        let mut state = self.state();
        let id = DiscussionId(state.next_id());
        let discussion = Discussion {
            id,
            owner: new.owner,
            book: new.book,
            title: new.title.clone(),
            content: new.content.clone(),
            status: DiscussionStatus::Proposed,
            start_date: new.start_date,
            closed_at: new.closed_at(),
            views: 0,
            analysis: None,
            version: 1,
            deleted: false,
            deleted_at: None,
            created_at: now,
        };
        state.discussions.insert(id, discussion.clone());
        Ok(discussion)
    }

    async fn find(&self, id: DiscussionId) -> Result<Option<Discussion>, RepositoryError> {
        Ok(self.discussion(id))
    }

    async fn list_live(&self) -> Result<Vec<Discussion>, RepositoryError> {
        Ok(self
            .state()
            .discussions
            .values()
            .filter(|d| d.is_live())
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: DiscussionId,
        status: DiscussionStatus,
        expected_version: i64,
    ) -> Result<Discussion, RepositoryError> {
        let mut state = self.state();
        let discussion = state.checked_mut(id, expected_version)?;
        discussion.status = status;
        Ok(discussion.clone())
    }

    async fn update_details(
        &self,
        edited: &Discussion,
        expected_version: i64,
    ) -> Result<Discussion, RepositoryError> {
        let mut state = self.state();
        let discussion = state.checked_mut(edited.id, expected_version)?;
        discussion.title = edited.title.clone();
        discussion.content = edited.content.clone();
        discussion.start_date = edited.start_date;
        discussion.closed_at = edited.closed_at;
        Ok(discussion.clone())
    }

    async fn soft_delete(
        &self,
        id: DiscussionId,
        at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<Discussion, RepositoryError> {
        let mut state = self.state();
        let discussion = state.checked_mut(id, expected_version)?;
        discussion.deleted = true;
        discussion.deleted_at = Some(at);
        Ok(discussion.clone())
    }

    async fn increment_views(&self, id: DiscussionId) -> Result<(), RepositoryError> {
        self.state().discussion_mut(id)?.views += 1;
        Ok(())
    }

    async fn record_analysis(
        &self,
        id: DiscussionId,
        outcome: &AnalysisOutcome,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state();
        let discussion = state.discussion_mut(id)?;
        if discussion.analysis.is_some() {
            return Ok(false);
        }
        discussion.analysis = Some(outcome.clone());
        Ok(true)
    }
}

#[async_trait]
impl ParticipantRepository for MemoryStore {
    async fn find(
        &self,
        discussion_id: DiscussionId,
        member_id: MemberId,
    ) -> Result<Option<Participant>, RepositoryError> {
        Ok(self
            .state()
            .participants
            .get(&(discussion_id, member_id))
            .copied())
    }

    async fn insert(&self, participant: &Participant) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let key = (participant.discussion_id, participant.member_id);
        if state.participants.contains_key(&key) {
            return Err(RepositoryError::Duplicate(format!(
                "participant {} in discussion {}",
                participant.member_id, participant.discussion_id
            )));
        }
        state.participants.insert(key, *participant);
        Ok(())
    }

    async fn replace(&self, participant: &Participant) -> Result<(), RepositoryError> {
        self.state().participants.insert(
            (participant.discussion_id, participant.member_id),
            *participant,
        );
        Ok(())
    }

    async fn delete(
        &self,
        discussion_id: DiscussionId,
        member_id: MemberId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .state()
            .participants
            .remove(&(discussion_id, member_id))
            .is_some())
    }

    async fn tally(&self, discussion_id: DiscussionId) -> Result<Tally, RepositoryError> {
        let state = self.state();
        Ok(Tally::from_participants(
            state
                .participants
                .values()
                .filter(|p| p.discussion_id == discussion_id),
        ))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(
        &self,
        draft: &CommentDraft,
        now: DateTime<Utc>,
    ) -> Result<Comment, RepositoryError> {
        self.state().place(draft, now)
    }

    async fn find(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        Ok(self.state().comments.get(&id).cloned())
    }

    async fn list_thread(
        &self,
        discussion_id: DiscussionId,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let mut thread: Vec<Comment> = self
            .state()
            .comments
            .values()
            .filter(|c| c.discussion_id == discussion_id)
            .cloned()
            .collect();
        thread.sort_by_key(|c| c.total_order);
        Ok(thread)
    }

    async fn soft_delete(&self, id: CommentId) -> Result<(), RepositoryError> {
        self.state()
            .comments
            .get_mut(&id)
            .map(|c| c.deleted = true)
            .ok_or_else(|| RepositoryError::comment_not_found(id))
    }

    async fn set_status(
        &self,
        id: CommentId,
        status: CommentStatus,
    ) -> Result<(), RepositoryError> {
        self.state()
            .comments
            .get_mut(&id)
            .map(|c| c.status = status)
            .ok_or_else(|| RepositoryError::comment_not_found(id))
    }

    async fn count_by_author_vote(
        &self,
        discussion_id: DiscussionId,
        author: MemberId,
        vote: VoteType,
    ) -> Result<usize, RepositoryError> {
        Ok(self
            .state()
            .comments
            .values()
            .filter(|c| {
                c.discussion_id == discussion_id && c.author == author && c.vote == vote && !c.deleted
            })
            .count())
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn insert(
        &self,
        report: &NewReport,
        now: DateTime<Utc>,
    ) -> Result<Report, RepositoryError> {
        let mut state = self.state();
        if state
            .reports
            .iter()
            .any(|r| {
                r.reporter == report.reporter
                    && r.target == report.target
                    && r.status == ReportStatus::Pending
            })
        {
            return Err(RepositoryError::Duplicate(format!(
                "report by {} on {}",
                report.reporter, report.target
            )));
        }
        let stored = Report {
            id: ReportId(state.next_id()),
            reporter: report.reporter,
            target: report.target,
            reason: report.reason.clone(),
            status: ReportStatus::Pending,
            created_at: now,
        };
        state.reports.push(stored.clone());
        Ok(stored)
    }

    async fn count_pending(&self, target: ReportTarget) -> Result<usize, RepositoryError> {
        Ok(self.pending_reports(target))
    }

    async fn accept_pending(&self, target: ReportTarget) -> Result<usize, RepositoryError> {
        let mut state = self.state();
        let mut accepted = 0;
        for report in state
            .reports
            .iter_mut()
            .filter(|r| r.target == target && r.status == ReportStatus::Pending)
        {
            report.status = ReportStatus::AcceptedPendingReview;
            accepted += 1;
        }
        Ok(accepted)
    }
}

#[async_trait]
impl ScheduledJobStore for MemoryStore {
    async fn upsert_all(&self, jobs: &[ScheduledJob]) -> Result<(), RepositoryError> {
        let mut state = self.state();
        for job in jobs {
            state.jobs.insert(job.key(), job.clone());
        }
        Ok(())
    }

    async fn find(
        &self,
        discussion_id: DiscussionId,
        stage: Stage,
    ) -> Result<Option<ScheduledJob>, RepositoryError> {
        Ok(self.job(JobKey::new(discussion_id, stage)))
    }

    async fn list_for(
        &self,
        discussion_id: DiscussionId,
    ) -> Result<Vec<ScheduledJob>, RepositoryError> {
        Ok(self.jobs_for(discussion_id))
    }

    async fn list_all(&self) -> Result<Vec<ScheduledJob>, RepositoryError> {
        Ok(self.state().jobs.values().cloned().collect())
    }

    async fn update_fire_times(
        &self,
        discussion_id: DiscussionId,
        fire_times: &[(Stage, DateTime<Utc>)],
    ) -> Result<Vec<ScheduledJob>, RepositoryError> {
        let mut state = self.state();
        let mut updated = Vec::new();
        for (stage, fire_at) in fire_times {
            if let Some(job) = state.jobs.get_mut(&JobKey::new(discussion_id, *stage)) {
                *job = job.rescheduled(*fire_at);
                updated.push(job.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(
        &self,
        discussion_id: DiscussionId,
        stage: Stage,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .state()
            .jobs
            .remove(&JobKey::new(discussion_id, stage))
            .is_some())
    }

    async fn delete_all(&self, discussion_id: DiscussionId) -> Result<usize, RepositoryError> {
        let mut state = self.state();
        let before = state.jobs.len();
        state.jobs.retain(|key, _| key.discussion_id != discussion_id);
        Ok(before - state.jobs.len())
    }
}

// ==================== Timer engine, clock, gateways ====================

/// Records what is armed; never fires on its own.
pub(crate) struct ManualTimerEngine {
    armed: Mutex<HashMap<JobKey, DateTime<Utc>>>,
    fail: AtomicBool,
}

impl ManualTimerEngine {
    pub fn new() -> Self {
        Self {
            armed: Mutex::new(HashMap::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail_arming(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn armed_at(&self, key: JobKey) -> Option<DateTime<Utc>> {
        self.armed.lock().unwrap().get(&key).copied()
    }
}

impl TimerEngine for ManualTimerEngine {
    fn arm(&self, job: &ScheduledJob) -> Result<(), SchedulingError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SchedulingError::EngineUnavailable("injected".to_string()));
        }
        self.armed.lock().unwrap().insert(job.key(), job.fire_at);
        Ok(())
    }

    fn disarm(&self, key: JobKey) -> bool {
        self.armed.lock().unwrap().remove(&key).is_some()
    }

    fn disarm_all(&self, discussion_id: DiscussionId) -> usize {
        let mut armed = self.armed.lock().unwrap();
        let before = armed.len();
        armed.retain(|key, _| key.discussion_id != discussion_id);
        before - armed.len()
    }

    fn armed_count(&self) -> usize {
        self.armed.lock().unwrap().len()
    }
}

pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) struct StubAnalysis {
    fail: bool,
    calls: AtomicUsize,
}

impl StubAnalysis {
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn outcome() -> AnalysisOutcome {
        AnalysisOutcome::new(
            "The narrator is unreliable",
            Verdict::Agree,
            60,
            40,
            "Most arguments cite the final chapter",
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisGateway for StubAnalysis {
    async fn analyze(&self, _discussion_id: DiscussionId) -> Result<AnalysisOutcome, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(AnalysisError::RequestFailed("stub".to_string()))
        } else {
            Ok(Self::outcome())
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingEventLog {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingEventLog {
    pub fn types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl LifecycleEventLog for RecordingEventLog {
    fn record(&self, event: LifecycleEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}

pub(crate) struct KnownIds {
    members: Vec<i64>,
    books: Vec<i64>,
}

impl KnownIds {
    pub fn new(members: &[i64], books: &[i64]) -> Self {
        Self {
            members: members.to_vec(),
            books: books.to_vec(),
        }
    }
}

#[async_trait]
impl MemberDirectory for KnownIds {
    async fn member_exists(&self, member: MemberId) -> Result<bool, LookupError> {
        Ok(self.members.contains(&member.get()))
    }
}

#[async_trait]
impl BookCatalog for KnownIds {
    async fn book_exists(&self, book: BookId) -> Result<bool, LookupError> {
        Ok(self.books.contains(&book.get()))
    }
}

// ==================== Harness ====================

pub(crate) struct Harness {
    pub store: Arc<MemoryStore>,
    pub engine: Arc<ManualTimerEngine>,
    pub clock: Arc<FixedClock>,
    pub analysis: Arc<StubAnalysis>,
    pub events: Arc<RecordingEventLog>,
    pub orchestrator: Arc<LifecycleOrchestrator>,
    pub ledger: Arc<VoteLedger>,
    pub transition: Arc<TransitionUseCase>,
    pub dispatcher: Arc<JobDispatcher>,
    pub restore: RestoreScheduleUseCase,
    pub comments: CommentThreadUseCase,
    pub moderation: ModerationUseCase,
    pub manage: ManageDiscussionUseCase,
}

impl Harness {
    /// Wired and already restored.
    pub fn new() -> Self {
        let h = Self::unrestored();
        h.orchestrator.mark_ready();
        h
    }

    /// Wired, but the orchestrator still waits for a restore pass.
    pub fn unrestored() -> Self {
        let directory = Arc::new(OpenDirectory);
        Self::build(directory.clone(), directory)
    }

    pub fn with_catalog(ids: Arc<KnownIds>) -> Self {
        let h = Self::build(ids.clone(), ids);
        h.orchestrator.mark_ready();
        h
    }

    fn build(members: Arc<dyn MemberDirectory>, books: Arc<dyn BookCatalog>) -> Self {
        let config = crate::config::LifecycleConfig::default();
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(ManualTimerEngine::new());
        let clock = Arc::new(FixedClock(now()));
        let analysis = Arc::new(StubAnalysis::succeeding());
        let events = Arc::new(RecordingEventLog::default());

        let orchestrator = Arc::new(
            LifecycleOrchestrator::new(store.clone(), engine.clone(), config.timeline)
                .with_event_log(events.clone()),
        );
        let ledger = Arc::new(VoteLedger::new(store.clone(), store.clone()));
        let runner = Arc::new(
            AnalysisRunner::new(analysis.clone(), store.clone()).with_event_log(events.clone()),
        );
        let transition = Arc::new(
            TransitionUseCase::new(
                store.clone(),
                ledger.clone(),
                orchestrator.clone(),
                runner,
                config.quorum,
            )
            .with_event_log(events.clone()),
        );
        let dispatcher = Arc::new(JobDispatcher::new(transition.clone(), orchestrator.clone()));
        let restore = RestoreScheduleUseCase::new(store.clone(), store.clone(), orchestrator.clone())
            .with_event_log(events.clone());
        let comments =
            CommentThreadUseCase::new(store.clone(), store.clone(), ledger.clone(), clock.clone());
        let moderation = ModerationUseCase::new(
            store.clone(),
            store.clone(),
            store.clone(),
            orchestrator.clone(),
            config.moderation,
            clock.clone(),
        )
        .with_event_log(events.clone());
        let manage = ManageDiscussionUseCase::new(
            store.clone(),
            ledger.clone(),
            members,
            books,
            orchestrator.clone(),
            clock.clone(),
        );

        Self {
            store,
            engine,
            clock,
            analysis,
            events,
            orchestrator,
            ledger,
            transition,
            dispatcher,
            restore,
            comments,
            moderation,
            manage,
        }
    }

    /// Seed a proposed discussion and register its timeline.
    pub async fn create_registered(&self, start: DateTime<Utc>) -> DiscussionId {
        let id = self.store.seed_discussion(DiscussionStatus::Proposed, start);
        self.orchestrator.register_timeline(id, start).await.unwrap();
        id
    }

    pub fn status(&self, id: DiscussionId) -> DiscussionStatus {
        self.store.discussion(id).unwrap().status
    }

    /// Let detached tasks run to completion.
    pub async fn settle(&self) {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }
}
