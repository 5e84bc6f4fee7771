//! Tokio-backed timer engine

use chrono::{DateTime, Utc};
use debate_application::{Clock, FiredJob, SchedulingError, TimerEngine};
use debate_domain::{DiscussionId, JobKey, ScheduledJob};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

struct Armed {
    generation: u64,
    token: CancellationToken,
}

type ArmedMap = Arc<Mutex<HashMap<JobKey, Armed>>>;

/// In-memory timers, rebuilt from the durable schedule at boot.
///
/// Re-arming a key replaces its timer. Fire times already in the past fire
/// immediately.
pub struct TokioTimerEngine {
    clock: Arc<dyn Clock>,
    armed: ArmedMap,
    fired: mpsc::Sender<FiredJob>,
    generation: AtomicU64,
    shutdown: CancellationToken,
}

impl TokioTimerEngine {
    /// Create an engine and the receiving end of its fired-job channel.
    pub fn new(clock: Arc<dyn Clock>, capacity: usize) -> (Self, mpsc::Receiver<FiredJob>) {
        let (fired, rx) = mpsc::channel(capacity.max(1));
        let engine = Self {
            clock,
            armed: Arc::new(Mutex::new(HashMap::new())),
            fired,
            generation: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        };
        (engine, rx)
    }

    /// Cancel every timer and refuse further arming.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        lock(&self.armed).clear();
    }

    fn delay_until(&self, fire_at: DateTime<Utc>) -> Duration {
        (fire_at - self.clock.now()).to_std().unwrap_or(Duration::ZERO)
    }
}

fn lock(armed: &ArmedMap) -> MutexGuard<'_, HashMap<JobKey, Armed>> {
    armed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TimerEngine for TokioTimerEngine {
    fn arm(&self, job: &ScheduledJob) -> Result<(), SchedulingError> {
        if self.shutdown.is_cancelled() {
            return Err(SchedulingError::EngineClosed);
        }
        let handle =
            Handle::try_current().map_err(|e| SchedulingError::EngineUnavailable(e.to_string()))?;

        let key = job.key();
        let delay = self.delay_until(job.fire_at);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let token = self.shutdown.child_token();

        if let Some(previous) = lock(&self.armed).insert(
            key,
            Armed {
                generation,
                token: token.clone(),
            },
        ) {
            previous.token.cancel();
        }

        let armed = Arc::clone(&self.armed);
        let fired = self.fired.clone();
        let delivery = FiredJob {
            key,
            fire_at: job.fire_at,
        };
        debug!("Timer {} fires in {:?}", key, delay);

        handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            {
                let mut armed = lock(&armed);
                match armed.get(&key) {
                    Some(current) if current.generation == generation => {
                        armed.remove(&key);
                    }
                    _ => return,
                }
            }

            trace!("Timer {} fired", key);
            if fired.send(delivery).await.is_err() {
                debug!("Dispatcher gone, dropping fired job {}", key);
            }
        });

        Ok(())
    }

    fn disarm(&self, key: JobKey) -> bool {
        match lock(&self.armed).remove(&key) {
            Some(armed) => {
                armed.token.cancel();
                true
            }
            None => false,
        }
    }

    fn disarm_all(&self, discussion_id: DiscussionId) -> usize {
        let mut armed = lock(&self.armed);
        let before = armed.len();
        armed.retain(|key, timer| {
            if key.discussion_id == discussion_id {
                timer.token.cancel();
                false
            } else {
                true
            }
        });
        before - armed.len()
    }

    fn armed_count(&self) -> usize {
        lock(&self.armed).len()
    }
}

impl Drop for TokioTimerEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
