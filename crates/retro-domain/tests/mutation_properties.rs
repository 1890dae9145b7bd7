use retro_domain::{
    Board, Card, CardId, ColumnTemplate, CommandOutcome, Intent, MutationEngine, Owner,
    RejectReason, Template,
};
use std::collections::HashSet;

fn board_with_limits(per_card: u32, per_user: u32) -> Board {
    let template =
        Template::new(ColumnTemplate::from_names(["a", "b"])).with_vote_limits(per_card, per_user);
    Board::from_template("Retro", "team", template).unwrap()
}

fn add(engine: &MutationEngine, board: Board, column: &str, text: &str) -> (Board, CardId) {
    let card = Card::new(Owner::new("author", "Author"), column, text, "#ffffff");
    let id = card.id;
    let mutation = engine.apply(&board, &Intent::AddCard(card));
    assert!(mutation.outcome.is_applied());
    (mutation.board, id)
}

fn column_ids(board: &Board, column: &str) -> Vec<CardId> {
    board.column(column).unwrap().iter().map(|c| c.id).collect()
}

fn reorder(engine: &MutationEngine, board: &Board, card_id: CardId, index: usize) -> Board {
    engine
        .apply(
            board,
            &Intent::Reorder {
                card_id,
                column: "a".to_string(),
                target_index: index,
            },
        )
        .board
}

#[test]
fn test_reorder_first_of_two_cards_to_index_one() {
    let engine = MutationEngine::default();
    let board = board_with_limits(1, 5);
    let (board, c1) = add(&engine, board, "a", "C1");
    let (board, c2) = add(&engine, board, "a", "C2");

    let next = reorder(&engine, &board, c1, 1);
    assert_eq!(column_ids(&next, "a"), vec![c2, c1]);
}

#[test]
fn test_consecutive_reorders_equal_single_reorder() {
    let engine = MutationEngine::default();
    let mut board = board_with_limits(1, 5);
    let mut ids = Vec::new();
    for text in ["A", "B", "C", "D", "E"] {
        let (next, id) = add(&engine, board, "a", text);
        board = next;
        ids.push(id);
    }

    for &card in &ids {
        for i in 0..ids.len() {
            for j in 0..ids.len() {
                let twice = reorder(&engine, &reorder(&engine, &board, card, i), card, j);
                let once = reorder(&engine, &board, card, j);
                assert_eq!(
                    column_ids(&twice, "a"),
                    column_ids(&once, "a"),
                    "card {card} via {i} then {j}"
                );
            }
        }
    }
}

#[test]
fn test_favorite_accepts_or_rejects_by_limits() {
    let engine = MutationEngine::default();
    let board = board_with_limits(2, 3);
    let (board, a) = add(&engine, board, "a", "A");
    let (board, b) = add(&engine, board, "b", "B");

    let mut current = board;
    let attempts = [(a, true), (a, true), (a, false), (b, true), (b, false)];
    for (card_id, accepted) in attempts {
        let before = current.card(card_id).unwrap().votes.len();
        let mutation = engine.apply(
            &current,
            &Intent::Favorite {
                card_id,
                voter: "v".to_string(),
            },
        );
        let after = mutation.board.card(card_id).unwrap().votes.len();
        if accepted {
            assert!(mutation.outcome.is_applied());
            assert_eq!(after, before + 1);
        } else {
            assert!(mutation.outcome.rejection().is_some());
            assert_eq!(after, before);
        }
        current = mutation.board;
    }
    assert_eq!(current.votes_by("v"), 3);
}

#[test]
fn test_single_vote_budget_blocks_any_other_card() {
    let engine = MutationEngine::default();
    let board = board_with_limits(3, 1);
    let (board, a) = add(&engine, board, "a", "A");
    let (board, b) = add(&engine, board, "b", "B");
    let voted = engine
        .apply(
            &board,
            &Intent::Favorite {
                card_id: a,
                voter: "V".to_string(),
            },
        )
        .board;

    let mutation = engine.apply(
        &voted,
        &Intent::Favorite {
            card_id: b,
            voter: "V".to_string(),
        },
    );
    assert_eq!(
        mutation.outcome,
        CommandOutcome::Rejected(RejectReason::MaxPerUser)
    );
    assert_eq!(mutation.board, voted);
}

#[test]
fn test_unfavorite_after_favorite_restores_length() {
    let engine = MutationEngine::default();
    let board = board_with_limits(3, 3);
    let (board, a) = add(&engine, board, "a", "A");
    let before = board.card(a).unwrap().votes.len();

    let voted = engine
        .apply(
            &board,
            &Intent::Favorite {
                card_id: a,
                voter: "v".to_string(),
            },
        )
        .board;
    let restored = engine
        .apply(
            &voted,
            &Intent::Unfavorite {
                card_id: a,
                voter: "v".to_string(),
            },
        )
        .board;
    assert_eq!(restored.card(a).unwrap().votes.len(), before);
}

#[test]
fn test_merge_same_column_shrinks_column_and_unions_votes() {
    let engine = MutationEngine::default();
    let board = board_with_limits(5, 10);
    let (board, origin) = add(&engine, board, "a", "origin");
    let (mut board, target) = add(&engine, board, "a", "target");

    board.columns.get_mut("a").unwrap()[0].votes = vec!["x".into(), "y".into()];
    board.columns.get_mut("a").unwrap()[1].votes = vec!["y".into(), "z".into(), "z".into()];
    let expected: HashSet<_> = ["x", "y", "z"].into_iter().collect();
    let length_before = board.column("a").unwrap().len();

    let mutation = engine.apply(&board, &Intent::MergeSameColumn { origin, target });
    assert!(mutation.outcome.is_applied());
    let column = mutation.board.column("a").unwrap();
    assert_eq!(column.len(), length_before - 1);
    assert_eq!(column[0].votes.len(), expected.len());
    assert_eq!(column[0].text, "target\norigin");
}
