use super::{Command, CommandOutcome};
use crate::board::Board;
use crate::card::{CardId, VoterId};
use crate::vote::{eligibility, Eligibility};

/// Cast one vote, subject to the template's vote limits
pub struct Favorite {
    pub card_id: CardId,
    pub voter: VoterId,
}

impl Command for Favorite {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        let verdict = match board.card(self.card_id) {
            Some(card) => eligibility(board, card, &self.voter),
            None => return CommandOutcome::Unchanged,
        };
        if let Eligibility::Ineligible(limit) = verdict {
            return CommandOutcome::Rejected(limit.into());
        }
        match board.card_mut(self.card_id) {
            Some(card) => {
                card.add_vote(&self.voter);
                CommandOutcome::Applied
            }
            None => CommandOutcome::Unchanged,
        }
    }

    fn description(&self) -> String {
        format!("Vote for card {} as {}", self.card_id, self.voter)
    }
}

/// Retract one vote
pub struct Unfavorite {
    pub card_id: CardId,
    pub voter: VoterId,
}

impl Command for Unfavorite {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        match board.card_mut(self.card_id) {
            Some(card) => {
                if card.remove_vote(&self.voter) {
                    CommandOutcome::Applied
                } else {
                    CommandOutcome::Unchanged
                }
            }
            None => CommandOutcome::Unchanged,
        }
    }

    fn description(&self) -> String {
        format!("Remove vote on card {} by {}", self.card_id, self.voter)
    }
}
