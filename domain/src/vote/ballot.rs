//! Vote primitives and ledger rules

use crate::core::error::DomainError;
use crate::core::ids::{DiscussionId, MemberId};
use serde::{Deserialize, Serialize};

/// Stance carried by a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    Agree,
    Disagree,
}

impl VoteType {
    pub fn is_agree(&self) -> bool {
        matches!(self, VoteType::Agree)
    }

    pub fn from_is_agree(is_agree: bool) -> Self {
        if is_agree {
            VoteType::Agree
        } else {
            VoteType::Disagree
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            VoteType::Agree => VoteType::Disagree,
            VoteType::Disagree => VoteType::Agree,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Agree => "AGREE",
            VoteType::Disagree => "DISAGREE",
        }
    }
}

impl std::fmt::Display for VoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VoteType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AGREE" => Ok(VoteType::Agree),
            "DISAGREE" => Ok(VoteType::Disagree),
            _ => Err(DomainError::UnknownValue {
                field: "vote",
                value: s.to_string(),
            }),
        }
    }
}

/// A member's current stance in a discussion. Unique per (discussion, member).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub discussion_id: DiscussionId,
    pub member_id: MemberId,
    pub is_agree: bool,
}

impl Participant {
    pub fn new(discussion_id: DiscussionId, member_id: MemberId, vote: VoteType) -> Self {
        Self {
            discussion_id,
            member_id,
            is_agree: vote.is_agree(),
        }
    }

    pub fn vote(&self) -> VoteType {
        VoteType::from_is_agree(self.is_agree)
    }
}

/// Participant counts per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    pub agree: usize,
    pub disagree: usize,
}

impl Tally {
    pub fn new(agree: usize, disagree: usize) -> Self {
        Self { agree, disagree }
    }

    pub fn from_participants<'a>(participants: impl IntoIterator<Item = &'a Participant>) -> Self {
        participants
            .into_iter()
            .fold(Tally::default(), |mut tally, participant| {
                if participant.is_agree {
                    tally.agree += 1;
                } else {
                    tally.disagree += 1;
                }
                tally
            })
    }

    pub fn total(&self) -> usize {
        self.agree + self.disagree
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} agree / {} disagree", self.agree, self.disagree)
    }
}

/// What casting a vote does to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    /// Existing row already has this polarity
    Unchanged,
    /// No row yet
    Insert(VoteType),
    /// Existing row has the opposite polarity: delete it and insert the new one
    Replace { from: VoteType, to: VoteType },
}

/// Decide how a new comment's vote changes the member's participant row.
pub fn plan_vote(existing: Option<&Participant>, vote: VoteType) -> VoteChange {
    match existing {
        None => VoteChange::Insert(vote),
        Some(row) if row.vote() == vote => VoteChange::Unchanged,
        Some(row) => VoteChange::Replace {
            from: row.vote(),
            to: vote,
        },
    }
}

/// Whether deleting a comment of `vote` withdraws the member's stance.
///
/// Only a row of the same polarity is withdrawn, and only once the member has
/// no comments of that polarity left.
pub fn should_release(existing: Option<&Participant>, vote: VoteType, remaining: usize) -> bool {
    remaining == 0 && existing.is_some_and(|row| row.vote() == vote)
}
