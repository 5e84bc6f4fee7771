//! SQLite persistence
//!
//! [`SqliteStore`] implements every repository port over a single
//! connection. Multi-statement writes (comment shift and insert, report
//! acceptance, timeline upsert) each run in one transaction.

mod comments;
mod discussions;
mod error;
mod jobs;
mod participants;
mod reports;
mod schema;
mod store;

pub use error::StoreError;
pub use store::SqliteStore;
