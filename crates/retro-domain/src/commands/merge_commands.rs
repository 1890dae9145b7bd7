use chrono::Utc;
use std::collections::HashSet;

use super::{CardRef, Command, CommandOutcome, RejectReason};
use crate::board::Board;
use crate::card::{Card, CardId};

/// Combine `origin` into `target`: texts are joined and votes become the set
/// union, so a voter present on both cards keeps a single vote.
pub fn merge_cards(target: &Card, origin: &Card, separator: &str) -> Card {
    let mut merged = target.clone();
    merged.text = format!("{}{}{}", target.text, separator, origin.text);

    let mut seen = HashSet::new();
    merged.votes = target
        .votes
        .iter()
        .chain(origin.votes.iter())
        .filter(|voter| seen.insert(voter.as_str()))
        .cloned()
        .collect();
    merged.updated_at = Utc::now();
    merged
}

/// Replace the target in place and drop the origin from its sequence.
fn apply_merge(board: &mut Board, origin: CardId, target: CardId, separator: &str) -> CommandOutcome {
    let (Some((origin_column, _)), Some((target_column, target_index))) =
        (board.locate(origin), board.locate(target))
    else {
        return CommandOutcome::Unchanged;
    };
    let (Some(origin_card), Some(target_card)) = (board.card(origin), board.card(target)) else {
        return CommandOutcome::Unchanged;
    };
    let merged = merge_cards(target_card, origin_card, separator);

    board.columns.entry(target_column).or_default()[target_index] = merged;
    board
        .columns
        .entry(origin_column)
        .or_default()
        .retain(|c| c.id != origin);
    CommandOutcome::Applied
}

/// Merge two cards that sit in the same column
pub struct MergeSameColumn {
    pub origin: CardId,
    pub target: CardId,
    pub separator: String,
}

impl Command for MergeSameColumn {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        if self.origin == self.target {
            return CommandOutcome::Rejected(RejectReason::InvalidMergePair);
        }
        match (board.locate(self.origin), board.locate(self.target)) {
            (Some((origin_column, _)), Some((target_column, _))) => {
                if origin_column != target_column {
                    return CommandOutcome::Rejected(RejectReason::InvalidMergePair);
                }
            }
            _ => return CommandOutcome::Unchanged,
        }
        apply_merge(board, self.origin, self.target, &self.separator)
    }

    fn description(&self) -> String {
        format!("Merge card {} into {}", self.origin, self.target)
    }
}

/// Merge a card from one column into a card of another column
pub struct MergeCrossColumn {
    pub origin: CardRef,
    pub target: CardRef,
    pub separator: String,
}

impl Command for MergeCrossColumn {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        if self.origin.card_id == self.target.card_id || self.origin.column == self.target.column
        {
            return CommandOutcome::Rejected(RejectReason::InvalidMergePair);
        }
        match (
            board.locate(self.origin.card_id),
            board.locate(self.target.card_id),
        ) {
            (Some((origin_column, _)), Some((target_column, _))) => {
                if origin_column != self.origin.column || target_column != self.target.column {
                    return CommandOutcome::Rejected(RejectReason::InvalidMergePair);
                }
            }
            _ => return CommandOutcome::Unchanged,
        }
        apply_merge(
            board,
            self.origin.card_id,
            self.target.card_id,
            &self.separator,
        )
    }

    fn description(&self) -> String {
        format!(
            "Merge card {} ({}) into {} ({})",
            self.origin.card_id, self.origin.column, self.target.card_id, self.target.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Owner;
    use crate::column::ColumnTemplate;
    use crate::template::Template;

    fn card(column: &str, text: &str, votes: &[&str]) -> Card {
        let mut card = Card::new(Owner::new("u", "U"), column, text, "#fff");
        card.votes = votes.iter().map(|v| v.to_string()).collect();
        card
    }

    fn board(cards: Vec<Card>) -> Board {
        let template = Template::new(ColumnTemplate::from_names(["a", "b"]));
        let mut board = Board::from_template("b", "t", template).unwrap();
        for card in cards {
            board.columns.get_mut(&card.column).unwrap().push(card);
        }
        board
    }

    #[test]
    fn test_merge_cards_union_of_votes() {
        let target = card("a", "keep", &["x", "y", "x"]);
        let origin = card("a", "fold", &["y", "z"]);
        let merged = merge_cards(&target, &origin, " | ");
        assert_eq!(merged.text, "keep | fold");
        assert_eq!(merged.votes, vec!["x", "y", "z"]);
        assert_eq!(merged.id, target.id);
    }

    #[test]
    fn test_merge_same_column() {
        let first = card("a", "first", &["v"]);
        let origin = card("a", "origin", &["v", "w"]);
        let target = card("a", "target", &["u"]);
        let (origin_id, target_id) = (origin.id, target.id);
        let mut board = board(vec![first, target, origin]);

        let outcome = MergeSameColumn {
            origin: origin_id,
            target: target_id,
            separator: "\n".to_string(),
        }
        .execute(&mut board);

        assert_eq!(outcome, CommandOutcome::Applied);
        let column = board.column("a").unwrap();
        assert_eq!(column.len(), 2);
        assert_eq!(column[1].id, target_id);
        assert_eq!(column[1].text, "target\norigin");
        assert_eq!(column[1].votes.len(), 3);
        assert!(board.card(origin_id).is_none());
    }

    #[test]
    fn test_merge_same_column_rejects_different_columns() {
        let origin = card("a", "o", &[]);
        let target = card("b", "t", &[]);
        let (o, t) = (origin.id, target.id);
        let mut board = board(vec![origin, target]);
        let before = board.clone();
        let outcome = MergeSameColumn {
            origin: o,
            target: t,
            separator: "\n".to_string(),
        }
        .execute(&mut board);
        assert_eq!(outcome, CommandOutcome::Rejected(RejectReason::InvalidMergePair));
        assert_eq!(board, before);
    }

    #[test]
    fn test_merge_with_self_rejected() {
        let only = card("a", "o", &[]);
        let id = only.id;
        let mut board = board(vec![only]);
        let outcome = MergeSameColumn {
            origin: id,
            target: id,
            separator: "\n".to_string(),
        }
        .execute(&mut board);
        assert_eq!(outcome, CommandOutcome::Rejected(RejectReason::InvalidMergePair));
    }

    #[test]
    fn test_merge_cross_column() {
        let origin = card("a", "o", &["v"]);
        let keep = card("b", "first", &[]);
        let target = card("b", "t", &["v"]);
        let (o, t) = (origin.id, target.id);
        let mut board = board(vec![origin, keep, target]);

        let outcome = MergeCrossColumn {
            origin: CardRef {
                card_id: o,
                column: "a".to_string(),
            },
            target: CardRef {
                card_id: t,
                column: "b".to_string(),
            },
            separator: " + ".to_string(),
        }
        .execute(&mut board);

        assert_eq!(outcome, CommandOutcome::Applied);
        assert!(board.column("a").unwrap().is_empty());
        let b = board.column("b").unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(b[1].id, t);
        assert_eq!(b[1].text, "t + o");
        assert_eq!(b[1].votes, vec!["v"]);
        assert_eq!(b[1].column, "b");
    }

    #[test]
    fn test_merge_cross_column_wrong_claimed_column() {
        let origin = card("a", "o", &[]);
        let target = card("b", "t", &[]);
        let (o, t) = (origin.id, target.id);
        let mut board = board(vec![origin, target]);
        let outcome = MergeCrossColumn {
            origin: CardRef {
                card_id: o,
                column: "b".to_string(),
            },
            target: CardRef {
                card_id: t,
                column: "a".to_string(),
            },
            separator: "\n".to_string(),
        }
        .execute(&mut board);
        assert_eq!(outcome, CommandOutcome::Rejected(RejectReason::InvalidMergePair));
    }

    #[test]
    fn test_merge_unknown_card_is_noop() {
        let target = card("a", "t", &[]);
        let t = target.id;
        let mut board = board(vec![target]);
        let outcome = MergeSameColumn {
            origin: uuid::Uuid::new_v4(),
            target: t,
            separator: "\n".to_string(),
        }
        .execute(&mut board);
        assert_eq!(outcome, CommandOutcome::Unchanged);
    }
}
