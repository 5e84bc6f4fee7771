//! Application-level configuration.
//!
//! - [`LifecycleConfig`] : timeline offsets, quorum gate and moderation threshold

pub mod lifecycle_config;

pub use lifecycle_config::LifecycleConfig;
