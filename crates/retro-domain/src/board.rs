use chrono::{DateTime, Utc};
use retro_core::RetroResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::card::{Card, CardId};
use crate::column::{ColumnKey, ColumnTemplate};
use crate::template::Template;
use crate::timer::BoardTimer;

pub type BoardId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardStatus {
    #[default]
    Active,
    Archived,
}

/// Full board state. This is the snapshot exchanged with the persistence gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub team_id: String,
    #[serde(default)]
    pub status: BoardStatus,
    #[serde(default)]
    pub timer: BoardTimer,
    pub template: Template,
    /// Card sequences by column key, in display order.
    #[serde(default)]
    pub columns: BTreeMap<ColumnKey, Vec<Card>>,
    /// Incremented by every applied local mutation.
    #[serde(default)]
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn from_template(
        name: impl Into<String>,
        team_id: impl Into<String>,
        template: Template,
    ) -> RetroResult<Self> {
        template.validate()?;
        let now = Utc::now();
        let mut board = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            team_id: team_id.into(),
            status: BoardStatus::Active,
            timer: BoardTimer::default(),
            template,
            columns: BTreeMap::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        board.ensure_columns();
        Ok(board)
    }

    pub fn is_active(&self) -> bool {
        self.status == BoardStatus::Active
    }

    /// Add an empty sequence for every template column that has none.
    pub fn ensure_columns(&mut self) {
        for column in &self.template.columns {
            self.columns.entry(column.key.clone()).or_default();
        }
    }

    /// Column keys holding a sequence but absent from the template.
    pub fn orphaned_columns(&self) -> Vec<&str> {
        self.columns
            .keys()
            .filter(|key| self.template.column(key).is_none())
            .map(|key| key.as_str())
            .collect()
    }

    /// Template columns in display order with their card sequences.
    pub fn ordered_columns(&self) -> impl Iterator<Item = (&ColumnTemplate, &[Card])> {
        self.template.columns.iter().map(move |column| {
            let cards = self
                .columns
                .get(&column.key)
                .map(|cards| cards.as_slice())
                .unwrap_or(&[]);
            (column, cards)
        })
    }

    pub fn column(&self, key: &str) -> Option<&[Card]> {
        self.columns.get(key).map(|cards| cards.as_slice())
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.columns.values().flatten()
    }

    pub fn card_count(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards().find(|c| c.id == id)
    }

    /// Column key and index of a card.
    pub fn locate(&self, id: CardId) -> Option<(ColumnKey, usize)> {
        self.columns.iter().find_map(|(key, cards)| {
            cards
                .iter()
                .position(|c| c.id == id)
                .map(|index| (key.clone(), index))
        })
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.columns.values_mut().flatten().find(|c| c.id == id)
    }

    /// Total votes a voter holds across the whole board.
    pub fn votes_by(&self, voter: &str) -> usize {
        self.cards().map(|c| c.likes_by(voter)).sum()
    }

    /// Record that a local mutation was applied.
    pub fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Owner;

    fn board() -> Board {
        Board::from_template(
            "Sprint 12",
            "team-a",
            Template::new(ColumnTemplate::from_names(["Went Well", "To Improve"])),
        )
        .unwrap()
    }

    #[test]
    fn test_from_template_creates_empty_columns() {
        let board = board();
        assert_eq!(board.columns.len(), 2);
        assert!(board.column("went-well").unwrap().is_empty());
        assert!(board.column("to-improve").unwrap().is_empty());
        assert!(board.is_active());
        assert_eq!(board.revision, 0);
    }

    #[test]
    fn test_from_template_rejects_invalid() {
        let result = Board::from_template("x", "t", Template::new(vec![]));
        assert!(result.is_err());
    }

    #[test]
    fn test_locate_and_votes_by() {
        let mut board = board();
        let mut a = Card::new(Owner::new("u1", "Ada"), "went-well", "a", "#fff");
        a.votes = vec!["v".into(), "v".into()];
        let mut b = Card::new(Owner::new("u1", "Ada"), "to-improve", "b", "#fff");
        b.votes = vec!["v".into(), "w".into()];
        let b_id = b.id;
        board.columns.get_mut("went-well").unwrap().push(a);
        board.columns.get_mut("to-improve").unwrap().push(b);

        assert_eq!(board.locate(b_id), Some(("to-improve".to_string(), 0)));
        assert_eq!(board.votes_by("v"), 3);
        assert_eq!(board.votes_by("w"), 1);
        assert_eq!(board.card_count(), 2);
        assert!(board.locate(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_orphaned_columns_after_rename() {
        let mut board = board();
        board.template.columns = ColumnTemplate::from_names(["Good", "To Improve"]);
        board.ensure_columns();
        assert_eq!(board.orphaned_columns(), vec!["went-well"]);
        assert!(board.column("good").is_some());
    }

    #[test]
    fn test_ordered_columns_follow_template() {
        let board = board();
        let keys: Vec<_> = board.ordered_columns().map(|(c, _)| c.key.as_str()).collect();
        assert_eq!(keys, vec!["went-well", "to-improve"]);
    }

    #[test]
    fn test_snapshot_serialization_roundtrip() {
        let board = board();
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, board);
        assert!(json.contains("\"status\":\"active\""));
    }
}
