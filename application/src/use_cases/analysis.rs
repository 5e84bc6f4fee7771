//! Detached post-debate analysis
//!
//! The analysis call is slow and must never hold up the transition that
//! triggered it. The runner spawns it and writes the outcome back when it
//! arrives; a failed call is logged and retried by nobody.

use crate::ports::analysis_gateway::AnalysisGateway;
use crate::ports::lifecycle_event_log::{LifecycleEvent, LifecycleEventLog, NoLifecycleEventLog};
use crate::ports::repositories::DiscussionRepository;
use debate_domain::DiscussionId;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct AnalysisRunner {
    gateway: Arc<dyn AnalysisGateway>,
    discussions: Arc<dyn DiscussionRepository>,
    events: Arc<dyn LifecycleEventLog>,
}

impl AnalysisRunner {
    pub fn new(
        gateway: Arc<dyn AnalysisGateway>,
        discussions: Arc<dyn DiscussionRepository>,
    ) -> Self {
        Self {
            gateway,
            discussions,
            events: Arc::new(NoLifecycleEventLog),
        }
    }

    pub fn with_event_log(mut self, events: Arc<dyn LifecycleEventLog>) -> Self {
        self.events = events;
        self
    }

    /// Request analysis for a discussion on a detached task.
    pub fn dispatch(&self, discussion_id: DiscussionId) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        let discussions = Arc::clone(&self.discussions);
        let events = Arc::clone(&self.events);

        tokio::spawn(async move {
            debug!("Requesting analysis for discussion {}", discussion_id);
            let outcome = match gateway.analyze(discussion_id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Analysis for discussion {} failed: {}", discussion_id, e);
                    events.record(LifecycleEvent::new(
                        "analysis_failed",
                        json!({ "discussion_id": discussion_id, "error": e.to_string() }),
                    ));
                    return;
                }
            };

            match discussions.record_analysis(discussion_id, &outcome).await {
                Ok(true) => {
                    info!(
                        "Analysis recorded for discussion {}: {}",
                        discussion_id,
                        outcome.result.as_str()
                    );
                    events.record(LifecycleEvent::new(
                        "analysis_recorded",
                        json!({ "discussion_id": discussion_id, "outcome": outcome }),
                    ));
                }
                Ok(false) => debug!(
                    "Discussion {} already has an analysis, result dropped",
                    discussion_id
                ),
                Err(e) => warn!(
                    "Could not store analysis for discussion {}: {}",
                    discussion_id, e
                ),
            }
        })
    }
}
