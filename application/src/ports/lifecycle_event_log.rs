//! Port for structured lifecycle event logging.
//!
//! Defines the [`LifecycleEventLog`] trait for recording lifecycle events
//! (timeline registration, transitions, gate failures, moderation blocks,
//! restores) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures an audit trail
//! of every status change in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured lifecycle event for logging.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The writer adds the timestamp.
pub struct LifecycleEvent {
    /// Event type identifier (e.g., "transition", "gate_failed", "blocked").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl LifecycleEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging lifecycle events to a structured log.
///
/// The `record` method is synchronous and non-fallible so it never disrupts a
/// transition; logging failures are ignored.
pub trait LifecycleEventLog: Send + Sync {
    fn record(&self, event: LifecycleEvent);
}

/// No-op implementation for tests and when the event log is disabled.
pub struct NoLifecycleEventLog;

impl LifecycleEventLog for NoLifecycleEventLog {
    fn record(&self, _event: LifecycleEvent) {}
}
