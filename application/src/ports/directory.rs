//! Member and book lookup ports
//!
//! Read-only existence checks against collaborators that own members and the
//! book catalog.

use async_trait::async_trait;
use debate_domain::{BookId, MemberId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Lookup failed: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn member_exists(&self, member: MemberId) -> Result<bool, LookupError>;
}

#[async_trait]
pub trait BookCatalog: Send + Sync {
    async fn book_exists(&self, book: BookId) -> Result<bool, LookupError>;
}

/// Accepts every id. Used when no member or catalog service is wired in.
pub struct OpenDirectory;

#[async_trait]
impl MemberDirectory for OpenDirectory {
    async fn member_exists(&self, _member: MemberId) -> Result<bool, LookupError> {
        Ok(true)
    }
}

#[async_trait]
impl BookCatalog for OpenDirectory {
    async fn book_exists(&self, _book: BookId) -> Result<bool, LookupError> {
        Ok(true)
    }
}
