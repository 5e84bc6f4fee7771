//! End-to-end lifecycle runs over SQLite and real timers on paused time

use crate::persistence::SqliteStore;
use crate::scheduler::TokioTimerEngine;
use crate::test_support::PausedClock;
use async_trait::async_trait;
use chrono::Duration;
use debate_application::*;
use debate_domain::*;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct CountingAnalysis {
    calls: AtomicUsize,
}

#[async_trait]
impl AnalysisGateway for CountingAnalysis {
    async fn analyze(&self, _discussion_id: DiscussionId) -> Result<AnalysisOutcome, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AnalysisOutcome::new("Split", Verdict::Undecided, 50, 50, "Even"))
    }
}

struct Stack {
    store: Arc<SqliteStore>,
    engine: Arc<TokioTimerEngine>,
    manage: ManageDiscussionUseCase,
    comments: CommentThreadUseCase,
    moderation: ModerationUseCase,
    analysis: Arc<CountingAnalysis>,
    shutdown: CancellationToken,
    dispatcher: JoinHandle<()>,
}

impl Stack {
    async fn boot(store: Arc<SqliteStore>, clock: Arc<PausedClock>) -> (Self, RestoreReport) {
        let config = LifecycleConfig::default();
        let (engine, fired) = TokioTimerEngine::new(clock.clone(), 64);
        let engine = Arc::new(engine);

        let orchestrator = Arc::new(LifecycleOrchestrator::new(
            store.clone(),
            engine.clone(),
            config.timeline,
        ));
        let ledger = Arc::new(VoteLedger::new(store.clone(), store.clone()));
        let analysis = Arc::new(CountingAnalysis::default());
        let runner = Arc::new(AnalysisRunner::new(analysis.clone(), store.clone()));
        let transition = Arc::new(TransitionUseCase::new(
            store.clone(),
            ledger.clone(),
            orchestrator.clone(),
            runner,
            config.quorum,
        ));
        let dispatcher = Arc::new(JobDispatcher::new(transition, orchestrator.clone()));
        let shutdown = CancellationToken::new();
        let dispatcher = tokio::spawn(dispatcher.run(fired, shutdown.clone()));

        let report = RestoreScheduleUseCase::new(store.clone(), store.clone(), orchestrator.clone())
            .execute()
            .await
            .unwrap();

        let stack = Self {
            manage: ManageDiscussionUseCase::new(
                store.clone(),
                ledger.clone(),
                Arc::new(OpenDirectory),
                Arc::new(OpenDirectory),
                orchestrator.clone(),
                clock.clone(),
            ),
            comments: CommentThreadUseCase::new(
                store.clone(),
                store.clone(),
                ledger,
                clock.clone(),
            ),
            moderation: ModerationUseCase::new(
                store.clone(),
                store.clone(),
                store.clone(),
                orchestrator,
                config.moderation,
                clock,
            ),
            store,
            engine,
            analysis,
            shutdown,
            dispatcher,
        };
        (stack, report)
    }

    /// Stop everything without any cleanup, as a killed process would.
    async fn crash(self) {
        self.shutdown.cancel();
        self.engine.shutdown();
        self.dispatcher.await.unwrap();
    }

    async fn propose(&self, clock: &PausedClock) -> DiscussionId {
        let start = clock.now() + Duration::days(1);
        self.manage
            .create(NewDiscussion::new(MemberId(10), BookId(100), "Ending", "Earned?", start))
            .await
            .unwrap()
            .id
    }

    async fn vote(&self, id: DiscussionId, member: i64, vote: VoteType) {
        self.comments
            .write_comment(CommentDraft::root(id, MemberId(member), vote, "stance"))
            .await
            .unwrap();
    }

    async fn reach_quorum(&self, id: DiscussionId) {
        self.vote(id, 1, VoteType::Agree).await;
        self.vote(id, 2, VoteType::Agree).await;
        self.vote(id, 3, VoteType::Disagree).await;
        self.vote(id, 4, VoteType::Disagree).await;
    }

    async fn status(&self, id: DiscussionId) -> DiscussionStatus {
        DiscussionRepository::find(&*self.store, id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    async fn pending(&self, id: DiscussionId) -> usize {
        self.store.list_for(id).await.unwrap().len()
    }
}

async fn advance(by: Duration) {
    tokio::time::sleep(by.to_std().unwrap()).await;
}

fn open(path: &Path) -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open(path).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_quorum_met_runs_to_completion() {
    let clock = Arc::new(PausedClock::new());
    let (stack, _) = Stack::boot(Arc::new(SqliteStore::open_in_memory().unwrap()), clock.clone()).await;
    let id = stack.propose(&clock).await;
    stack.reach_quorum(id).await;
    assert_eq!(stack.pending(id).await, 4);

    advance(Duration::days(1) - Duration::minutes(1)).await;
    assert_eq!(stack.status(id).await, DiscussionStatus::Scheduled);

    advance(Duration::minutes(2)).await;
    assert_eq!(stack.status(id).await, DiscussionStatus::InProgress);

    advance(Duration::days(1)).await;
    assert_eq!(stack.status(id).await, DiscussionStatus::Analyzing);
    assert_eq!(stack.analysis.calls.load(Ordering::SeqCst), 1);

    advance(Duration::minutes(10)).await;
    let discussion = DiscussionRepository::find(&*stack.store, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(discussion.status, DiscussionStatus::Completed);
    assert_eq!(discussion.analysis.unwrap().result, Verdict::Undecided);
    assert_eq!(stack.pending(id).await, 0);
    assert_eq!(stack.engine.armed_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missed_quorum_stays_proposed() {
    let clock = Arc::new(PausedClock::new());
    let (stack, _) = Stack::boot(Arc::new(SqliteStore::open_in_memory().unwrap()), clock.clone()).await;
    let id = stack.propose(&clock).await;
    stack.vote(id, 1, VoteType::Agree).await;
    stack.vote(id, 2, VoteType::Agree).await;
    stack.vote(id, 3, VoteType::Disagree).await;

    advance(Duration::days(1)).await;
    assert_eq!(stack.status(id).await, DiscussionStatus::Proposed);
    assert_eq!(stack.pending(id).await, 0);
    assert_eq!(stack.engine.armed_count(), 0);

    advance(Duration::days(3)).await;
    assert_eq!(stack.status(id).await, DiscussionStatus::Proposed);
    assert_eq!(stack.analysis.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_before_gate_rearms_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debate.db");
    let clock = Arc::new(PausedClock::new());

    let (first, report) = Stack::boot(open(&path), clock.clone()).await;
    assert_eq!(report.rearmed, 0);
    let id = first.propose(&clock).await;
    first.reach_quorum(id).await;
    first.crash().await;

    let (second, report) = Stack::boot(open(&path), clock.clone()).await;
    assert_eq!(report.rearmed, 4);
    assert_eq!(second.engine.armed_count(), 4);

    advance(Duration::days(3)).await;
    assert_eq!(second.status(id).await, DiscussionStatus::Completed);
    assert_eq!(second.pending(id).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_downtime_across_stages_catches_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debate.db");
    let clock = Arc::new(PausedClock::new());

    let (first, _) = Stack::boot(open(&path), clock.clone()).await;
    let id = first.propose(&clock).await;
    first.reach_quorum(id).await;
    advance(Duration::days(1) + Duration::minutes(1)).await;
    assert_eq!(first.status(id).await, DiscussionStatus::InProgress);
    first.crash().await;

    advance(Duration::days(2)).await;

    let (second, report) = Stack::boot(open(&path), clock.clone()).await;
    assert_eq!(report.discussions, 1);
    assert_eq!(report.rearmed, 2);

    advance(Duration::seconds(1)).await;
    assert_eq!(second.status(id).await, DiscussionStatus::Completed);
    assert_eq!(second.analysis.calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.pending(id).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_block_during_debate_halts_timeline() {
    let clock = Arc::new(PausedClock::new());
    let (stack, _) = Stack::boot(Arc::new(SqliteStore::open_in_memory().unwrap()), clock.clone()).await;
    let id = stack.propose(&clock).await;
    stack.reach_quorum(id).await;
    advance(Duration::days(1) + Duration::minutes(1)).await;
    assert_eq!(stack.status(id).await, DiscussionStatus::InProgress);

    for reporter in 20..23 {
        stack
            .moderation
            .on_report_added(NewReport::new(MemberId(reporter), ReportTarget::Discussion(id), "spoilers"))
            .await
            .unwrap();
    }

    assert_eq!(stack.status(id).await, DiscussionStatus::Blocked);
    assert_eq!(stack.pending(id).await, 0);
    assert_eq!(stack.engine.armed_count(), 0);

    advance(Duration::days(2)).await;
    assert_eq!(stack.status(id).await, DiscussionStatus::Blocked);
    assert_eq!(stack.analysis.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rescheduled_start_moves_every_stage() {
    let clock = Arc::new(PausedClock::new());
    let (stack, _) = Stack::boot(Arc::new(SqliteStore::open_in_memory().unwrap()), clock.clone()).await;
    let id = stack.propose(&clock).await;
    let later = clock.now() + Duration::days(2);
    stack
        .manage
        .edit(MemberId(10), id, DiscussionEdit::default().with_start_date(later))
        .await
        .unwrap();
    stack.reach_quorum(id).await;

    advance(Duration::days(1) + Duration::hours(1)).await;
    assert_eq!(stack.status(id).await, DiscussionStatus::Proposed);
    assert_eq!(stack.pending(id).await, 4);

    advance(Duration::days(1)).await;
    assert_eq!(stack.status(id).await, DiscussionStatus::InProgress);
}
