//! Logging infrastructure: the structured lifecycle audit trail.
//!
//! Provides [`JsonlLifecycleEventLog`], a JSONL file writer that implements
//! the [`LifecycleEventLog`](debate_application::LifecycleEventLog) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlLifecycleEventLog;
