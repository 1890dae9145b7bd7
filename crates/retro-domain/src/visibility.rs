//! Per-viewer projection of a board honouring the template's visibility flags.

use serde::Serialize;

use crate::board::{Board, BoardId};
use crate::card::{Card, CardId};
use crate::column::ColumnKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: CardId,
    /// `None` while other users' cards are hidden.
    pub text: Option<String>,
    pub color: String,
    /// `None` when authors are hidden and the viewer is not the author.
    pub author: Option<String>,
    /// `None` when vote reactions are hidden.
    pub total_votes: Option<usize>,
    pub own_votes: usize,
    pub is_own: bool,
}

impl CardView {
    fn project(card: &Card, board: &Board, viewer: &str) -> Self {
        let template = &board.template;
        let is_own = card.is_owned_by(viewer);
        Self {
            id: card.id,
            text: (!template.hide_cards_initially || is_own).then(|| card.text.clone()),
            color: card.color.clone(),
            author: (!template.hide_author || is_own).then(|| card.owner.name.clone()),
            total_votes: (!template.hide_vote_reactions).then_some(card.votes.len()),
            own_votes: card.likes_by(viewer),
            is_own,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub key: ColumnKey,
    pub name: String,
    pub color: String,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub id: BoardId,
    pub name: String,
    pub columns: Vec<ColumnView>,
    /// Votes the viewer may still cast on the board.
    pub votes_left: usize,
}

impl BoardView {
    pub fn for_viewer(board: &Board, viewer: &str) -> Self {
        let columns = board
            .ordered_columns()
            .map(|(column, cards)| ColumnView {
                key: column.key.clone(),
                name: column.name.clone(),
                color: column.color.clone(),
                cards: cards
                    .iter()
                    .map(|card| CardView::project(card, board, viewer))
                    .collect(),
            })
            .collect();
        let cap = board.template.max_votes_per_user as usize;
        Self {
            id: board.id,
            name: board.name.clone(),
            columns,
            votes_left: cap.saturating_sub(board.votes_by(viewer)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Owner;
    use crate::column::ColumnTemplate;
    use crate::template::Template;

    fn board(hide_author: bool, hide_cards: bool, hide_votes: bool) -> Board {
        let mut template = Template::new(ColumnTemplate::from_names(["Good", "Bad"]));
        template.hide_author = hide_author;
        template.hide_cards_initially = hide_cards;
        template.hide_vote_reactions = hide_votes;
        let mut board = Board::from_template("b", "t", template).unwrap();
        let mut mine = Card::new(Owner::new("me", "Me"), "good", "mine", "#fff");
        mine.votes = vec!["me".into(), "other".into()];
        let theirs = Card::new(Owner::new("other", "Other"), "good", "theirs", "#fff");
        board.columns.get_mut("good").unwrap().push(mine);
        board.columns.get_mut("good").unwrap().push(theirs);
        board
    }

    #[test]
    fn test_everything_visible_by_default() {
        let view = BoardView::for_viewer(&board(false, false, false), "me");
        assert_eq!(view.columns.len(), 2);
        let cards = &view.columns[0].cards;
        assert_eq!(cards[1].text.as_deref(), Some("theirs"));
        assert_eq!(cards[1].author.as_deref(), Some("Other"));
        assert_eq!(cards[0].total_votes, Some(2));
        assert_eq!(cards[0].own_votes, 1);
        assert_eq!(view.votes_left, 4);
    }

    #[test]
    fn test_hidden_flags_mask_others_only() {
        let view = BoardView::for_viewer(&board(true, true, true), "me");
        let cards = &view.columns[0].cards;
        assert_eq!(cards[0].text.as_deref(), Some("mine"));
        assert_eq!(cards[0].author.as_deref(), Some("Me"));
        assert_eq!(cards[1].text, None);
        assert_eq!(cards[1].author, None);
        assert_eq!(cards[0].total_votes, None);
        assert_eq!(cards[0].own_votes, 1);
    }
}
