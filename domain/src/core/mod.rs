//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: typed identifiers for discussions, members, books, comments and reports
//! - [`error::DomainError`]: domain-level errors
//! - [`validation`]: configuration issue reporting

pub mod error;
pub mod ids;
pub mod validation;
