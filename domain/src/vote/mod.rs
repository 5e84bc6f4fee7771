//! Vote ledger domain
//!
//! A member's stance in a discussion is never cast directly: it is implied by
//! the vote type of the comments they write. The ledger keeps one
//! [`Participant`] row per member and the quorum gate counts those rows.
//!
//! - [`ballot`]: vote types, participant rows, tallies and the ledger rules
//! - [`rule::QuorumRule`]: minimum agree/disagree participants for the gate

pub mod ballot;
pub mod rule;

pub use ballot::{Participant, Tally, VoteChange, VoteType, plan_vote, should_release};
pub use rule::QuorumRule;
