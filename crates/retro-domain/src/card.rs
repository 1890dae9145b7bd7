use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::column::ColumnKey;

pub type CardId = Uuid;
pub type VoterId = String;

/// Card author as captured when the card was created.
///
/// The display name is a copy, not a live reference: renaming the user later
/// does not change existing cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub name: String,
}

impl Owner {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub text: String,
    pub color: String,
    pub owner: Owner,
    pub column: ColumnKey,
    /// One entry per vote; a voter may appear several times.
    #[serde(default)]
    pub votes: Vec<VoterId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(
        owner: Owner,
        column: impl Into<ColumnKey>,
        text: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            color: color.into(),
            owner,
            column: column.into(),
            votes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of votes this voter has on the card.
    pub fn likes_by(&self, voter: &str) -> usize {
        self.votes.iter().filter(|v| v.as_str() == voter).count()
    }

    pub fn is_owned_by(&self, user: &str) -> bool {
        self.owner.id == user
    }

    pub fn update_text(&mut self, text: String) {
        self.text = text;
        self.updated_at = Utc::now();
    }

    pub fn add_vote(&mut self, voter: &str) {
        self.votes.push(voter.to_string());
        self.updated_at = Utc::now();
    }

    /// Remove the first vote by `voter`. Returns false if there was none.
    pub fn remove_vote(&mut self, voter: &str) -> bool {
        match self.votes.iter().position(|v| v == voter) {
            Some(pos) => {
                self.votes.remove(pos);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}
