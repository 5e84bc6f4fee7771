//! Dependency wiring for the binary

use anyhow::{Context, Result};
use debate_application::{
    AnalysisGateway, AnalysisRunner, CommentThreadUseCase, FiredJob, JobDispatcher,
    LifecycleEventLog, LifecycleOrchestrator, ManageDiscussionUseCase, ModerationUseCase,
    NoLifecycleEventLog, OpenDirectory, RestoreScheduleUseCase, SystemClock, TransitionUseCase,
    UnconfiguredAnalysis, VoteLedger,
};
use debate_infrastructure::{
    FileAnalysisConfig, FileConfig, JsonlLifecycleEventLog, SqliteStore, TokioTimerEngine,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

const FIRED_CAPACITY: usize = 256;

/// Every use case the commands need, sharing one store and one engine.
pub struct App {
    pub engine: Arc<TokioTimerEngine>,
    pub orchestrator: Arc<LifecycleOrchestrator>,
    pub dispatcher: Arc<JobDispatcher>,
    pub restore: RestoreScheduleUseCase,
    pub manage: ManageDiscussionUseCase,
    pub comments: CommentThreadUseCase,
    pub moderation: ModerationUseCase,
}

impl App {
    /// Build the object graph. The schedule is not restored yet.
    pub fn build(config: &FileConfig) -> Result<(Self, mpsc::Receiver<FiredJob>)> {
        let lifecycle = config.to_lifecycle_config();

        let db_path = config.storage.database_path();
        let store = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("opening database {}", db_path.display()))?,
        );
        info!("Using database {}", db_path.display());

        let events = event_log(config);
        let clock = Arc::new(SystemClock);
        let (engine, fired) = TokioTimerEngine::new(clock.clone(), FIRED_CAPACITY);
        let engine = Arc::new(engine);

        let orchestrator = Arc::new(
            LifecycleOrchestrator::new(store.clone(), engine.clone(), lifecycle.timeline)
                .with_event_log(events.clone()),
        );
        let ledger = Arc::new(VoteLedger::new(store.clone(), store.clone()));
        let analysis = Arc::new(
            AnalysisRunner::new(analysis_gateway(&config.analysis)?, store.clone())
                .with_event_log(events.clone()),
        );
        let transition = Arc::new(
            TransitionUseCase::new(
                store.clone(),
                ledger.clone(),
                orchestrator.clone(),
                analysis,
                lifecycle.quorum,
            )
            .with_event_log(events.clone()),
        );

        let app = Self {
            engine,
            dispatcher: Arc::new(JobDispatcher::new(transition, orchestrator.clone())),
            restore: RestoreScheduleUseCase::new(store.clone(), store.clone(), orchestrator.clone())
                .with_event_log(events.clone()),
            manage: ManageDiscussionUseCase::new(
                store.clone(),
                ledger.clone(),
                Arc::new(OpenDirectory),
                Arc::new(OpenDirectory),
                orchestrator.clone(),
                clock.clone(),
            ),
            comments: CommentThreadUseCase::new(store.clone(), store.clone(), ledger, clock.clone()),
            moderation: ModerationUseCase::new(
                store.clone(),
                store.clone(),
                store,
                orchestrator.clone(),
                lifecycle.moderation,
                clock,
            )
            .with_event_log(events),
            orchestrator,
        };
        Ok((app, fired))
    }
}

fn event_log(config: &FileConfig) -> Arc<dyn LifecycleEventLog> {
    match config
        .logging
        .event_log
        .as_ref()
        .and_then(JsonlLifecycleEventLog::open)
    {
        Some(log) => {
            info!("Writing lifecycle events to {}", log.path().display());
            Arc::new(log)
        }
        None => Arc::new(NoLifecycleEventLog),
    }
}

#[cfg(feature = "http-analysis")]
fn analysis_gateway(config: &FileAnalysisConfig) -> Result<Arc<dyn AnalysisGateway>> {
    match config.endpoint() {
        Some(endpoint) => {
            info!("Analysis service at {}", endpoint);
            let gateway = debate_infrastructure::HttpAnalysisGateway::new(endpoint, config.timeout())
                .context("creating analysis client")?;
            Ok(Arc::new(gateway))
        }
        None => Ok(Arc::new(UnconfiguredAnalysis)),
    }
}

#[cfg(not(feature = "http-analysis"))]
fn analysis_gateway(config: &FileAnalysisConfig) -> Result<Arc<dyn AnalysisGateway>> {
    if let Some(endpoint) = config.endpoint() {
        tracing::warn!(
            "analysis.endpoint {} ignored: built without the http-analysis feature",
            endpoint
        );
    }
    Ok(Arc::new(UnconfiguredAnalysis))
}
