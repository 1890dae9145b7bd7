use super::{Command, CommandOutcome};
use crate::board::Board;
use crate::card::{Card, CardId};
use crate::column::ColumnKey;

/// Convert a drop slot reported by a drag gesture into a final index.
///
/// Slots are positions in the column as it looked before the card was
/// lifted, so dropping below the card's own position shifts by one.
pub fn resolve_drop_slot(board: &Board, card_id: CardId, column: &str, slot: usize) -> usize {
    match board.locate(card_id) {
        Some((current, index)) if current == column && slot > index => slot - 1,
        _ => slot,
    }
}

/// Move a card to `target_index` of `column`, which may be its own column.
///
/// `target_index` is the card's index after the move and is clamped to the
/// end of the destination sequence.
pub struct Reorder {
    pub card_id: CardId,
    pub column: ColumnKey,
    pub target_index: usize,
}

impl Command for Reorder {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        let Some((source, index)) = board.locate(self.card_id) else {
            return CommandOutcome::Unchanged;
        };
        if !board.columns.contains_key(&self.column) {
            return CommandOutcome::Unchanged;
        }

        if source == self.column {
            let cards = board.columns.entry(source).or_default();
            let destination = self.target_index.min(cards.len() - 1);
            if destination == index {
                return CommandOutcome::Unchanged;
            }
            let card = cards.remove(index);
            cards.insert(destination, card);
            return CommandOutcome::Applied;
        }

        let mut card = board.columns.entry(source).or_default().remove(index);
        card.column = self.column.clone();
        card.updated_at = chrono::Utc::now();
        let cards = board.columns.entry(self.column.clone()).or_default();
        let destination = self.target_index.min(cards.len());
        cards.insert(destination, card);
        CommandOutcome::Applied
    }

    fn description(&self) -> String {
        format!(
            "Reorder card {} to {}[{}]",
            self.card_id, self.column, self.target_index
        )
    }
}

/// Replace a card's text in place
pub struct EditText {
    pub card_id: CardId,
    pub text: String,
}

impl Command for EditText {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        match board.card_mut(self.card_id) {
            Some(card) if card.text != self.text => {
                card.update_text(self.text.clone());
                CommandOutcome::Applied
            }
            _ => CommandOutcome::Unchanged,
        }
    }

    fn description(&self) -> String {
        format!("Edit text of card {}", self.card_id)
    }
}

/// Append a card to the end of its column
pub struct AddCard {
    pub card: Card,
}

impl Command for AddCard {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        if board.locate(self.card.id).is_some() {
            return CommandOutcome::Unchanged;
        }
        match board.columns.get_mut(&self.card.column) {
            Some(cards) => {
                cards.push(self.card.clone());
                CommandOutcome::Applied
            }
            None => CommandOutcome::Unchanged,
        }
    }

    fn description(&self) -> String {
        format!("Add card {} to {}", self.card.id, self.card.column)
    }
}

pub struct DeleteCard {
    pub card_id: CardId,
}

impl Command for DeleteCard {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        match board.locate(self.card_id) {
            Some((column, index)) => {
                board.columns.entry(column).or_default().remove(index);
                CommandOutcome::Applied
            }
            None => CommandOutcome::Unchanged,
        }
    }

    fn description(&self) -> String {
        format!("Delete card {}", self.card_id)
    }
}
