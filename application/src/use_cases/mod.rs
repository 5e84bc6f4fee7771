//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod analysis;
pub mod comment_thread;
pub mod dispatcher;
pub mod error;
pub mod manage_discussion;
pub mod moderation;
pub mod orchestrator;
pub mod restore;
pub mod transition;
pub mod vote_ledger;

#[cfg(test)]
pub(crate) mod test_support;
