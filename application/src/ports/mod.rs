//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod analysis_gateway;
pub mod clock;
pub mod directory;
pub mod lifecycle_event_log;
pub mod repositories;
pub mod timer_engine;
