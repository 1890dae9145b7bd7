//! Vote eligibility against a board's template limits.
//!
//! There are no stored per-voter counters: every check scans the whole board.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::card::Card;

/// Which limit blocked a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoteLimit {
    MaxPerCard,
    MaxPerUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// `remaining` counts the pending vote as already cast. Display only.
    Eligible { remaining: u32 },
    Ineligible(VoteLimit),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible { .. })
    }

    pub fn reason(&self) -> Option<VoteLimit> {
        match self {
            Eligibility::Eligible { .. } => None,
            Eligibility::Ineligible(limit) => Some(*limit),
        }
    }

    pub fn remaining(&self) -> u32 {
        match self {
            Eligibility::Eligible { remaining } => *remaining,
            Eligibility::Ineligible(_) => 0,
        }
    }
}

/// Evaluate whether `voter` may add another vote to `card` on `board`.
///
/// The per-card limit is checked first and wins when both limits apply.
pub fn eligibility(board: &Board, card: &Card, voter: &str) -> Eligibility {
    let template = &board.template;
    let likes_on_card = card.likes_by(voter) as u64;
    let total_likes = board.votes_by(voter) as u64;
    let per_card = u64::from(template.max_votes_per_card);
    let per_user = u64::from(template.max_votes_per_user);

    if likes_on_card >= per_card {
        return Eligibility::Ineligible(VoteLimit::MaxPerCard);
    }
    if total_likes >= per_user {
        return Eligibility::Ineligible(VoteLimit::MaxPerUser);
    }
    let remaining = per_user - total_likes - 1;
    Eligibility::Eligible {
        remaining: remaining as u32,
    }
}
