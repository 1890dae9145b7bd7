use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::card::{Card, CardId, VoterId};
use crate::column::ColumnKey;
use crate::template::TemplateUpdate;
use crate::vote::VoteLimit;

pub mod board_commands;
pub mod card_commands;
pub mod merge_commands;
pub mod vote_commands;

pub use board_commands::*;
pub use card_commands::*;
pub use merge_commands::*;
pub use vote_commands::*;

/// Trait for board mutations.
///
/// Commands never fail: unknown ids leave the board untouched and report
/// `Unchanged`, violated constraints report `Rejected` without mutating.
pub trait Command: Send + Sync {
    /// Execute this command against the board in place
    fn execute(&self, board: &mut Board) -> CommandOutcome;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Unchanged,
    Rejected(RejectReason),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }

    pub fn rejection(&self) -> Option<RejectReason> {
        match self {
            CommandOutcome::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    MaxPerCard,
    MaxPerUser,
    InvalidMergePair,
    InvalidTemplate,
}

impl From<VoteLimit> for RejectReason {
    fn from(limit: VoteLimit) -> Self {
        match limit {
            VoteLimit::MaxPerCard => RejectReason::MaxPerCard,
            VoteLimit::MaxPerUser => RejectReason::MaxPerUser,
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            RejectReason::MaxPerCard => "max-per-card",
            RejectReason::MaxPerUser => "max-per-user",
            RejectReason::InvalidMergePair => "invalid-merge-pair",
            RejectReason::InvalidTemplate => "invalid-template",
        };
        f.write_str(code)
    }
}

/// A card together with the column the caller believes it is in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRef {
    pub card_id: CardId,
    pub column: ColumnKey,
}

/// Every mutation a board accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Reorder {
        card_id: CardId,
        column: ColumnKey,
        target_index: usize,
    },
    Favorite {
        card_id: CardId,
        voter: VoterId,
    },
    Unfavorite {
        card_id: CardId,
        voter: VoterId,
    },
    EditText {
        card_id: CardId,
        text: String,
    },
    AddCard(Card),
    DeleteCard(CardId),
    MergeSameColumn {
        origin: CardId,
        target: CardId,
    },
    MergeCrossColumn {
        origin: CardRef,
        target: CardRef,
    },
    UpdateTemplate(TemplateUpdate),
    Archive,
    StopTimer,
}

/// Result of applying an intent to a snapshot.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub board: Board,
    pub outcome: CommandOutcome,
}

/// Pure `(Board, Intent) -> Board` transformation.
#[derive(Debug, Clone)]
pub struct MutationEngine {
    merge_separator: String,
}

impl MutationEngine {
    pub fn new(merge_separator: impl Into<String>) -> Self {
        Self {
            merge_separator: merge_separator.into(),
        }
    }

    pub fn merge_separator(&self) -> &str {
        &self.merge_separator
    }

    pub fn command_for(&self, intent: &Intent) -> Box<dyn Command> {
        match intent.clone() {
            Intent::Reorder {
                card_id,
                column,
                target_index,
            } => Box::new(Reorder {
                card_id,
                column,
                target_index,
            }),
            Intent::Favorite { card_id, voter } => Box::new(Favorite { card_id, voter }),
            Intent::Unfavorite { card_id, voter } => Box::new(Unfavorite { card_id, voter }),
            Intent::EditText { card_id, text } => Box::new(EditText { card_id, text }),
            Intent::AddCard(card) => Box::new(AddCard { card }),
            Intent::DeleteCard(card_id) => Box::new(DeleteCard { card_id }),
            Intent::MergeSameColumn { origin, target } => Box::new(MergeSameColumn {
                origin,
                target,
                separator: self.merge_separator.clone(),
            }),
            Intent::MergeCrossColumn { origin, target } => Box::new(MergeCrossColumn {
                origin,
                target,
                separator: self.merge_separator.clone(),
            }),
            Intent::UpdateTemplate(updates) => Box::new(UpdateTemplate { updates }),
            Intent::Archive => Box::new(ArchiveBoard),
            Intent::StopTimer => Box::new(StopTimer),
        }
    }

    /// Compute the next snapshot. The input is never modified; on anything
    /// other than `Applied` the returned board equals the input.
    pub fn apply(&self, board: &Board, intent: &Intent) -> Mutation {
        let command = self.command_for(intent);
        let mut next = board.clone();
        let outcome = command.execute(&mut next);
        tracing::debug!("{} -> {:?}", command.description(), outcome);

        match outcome {
            CommandOutcome::Applied => {
                next.touch();
                Mutation {
                    board: next,
                    outcome,
                }
            }
            _ => Mutation {
                board: board.clone(),
                outcome,
            },
        }
    }
}

impl Default for MutationEngine {
    fn default() -> Self {
        Self::new(retro_core::config::DEFAULT_MERGE_SEPARATOR)
    }
}
