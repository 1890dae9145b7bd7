use chrono::{DateTime, Utc};
use retro_core::{RetroError, RetroResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::column::ColumnTemplate;
use crate::field_update::FieldUpdate;

pub const DEFAULT_MAX_VOTES_PER_CARD: u32 = 1;
pub const DEFAULT_MAX_VOTES_PER_USER: u32 = 5;

/// Board configuration: columns, vote limits, and visibility flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub columns: Vec<ColumnTemplate>,
    #[serde(default = "default_max_votes_per_card")]
    pub max_votes_per_card: u32,
    #[serde(default = "default_max_votes_per_user")]
    pub max_votes_per_user: u32,
    #[serde(default)]
    pub hide_author: bool,
    #[serde(default)]
    pub hide_cards_initially: bool,
    #[serde(default)]
    pub hide_vote_reactions: bool,
}

fn default_max_votes_per_card() -> u32 {
    DEFAULT_MAX_VOTES_PER_CARD
}

fn default_max_votes_per_user() -> u32 {
    DEFAULT_MAX_VOTES_PER_USER
}

impl Template {
    pub fn new(columns: Vec<ColumnTemplate>) -> Self {
        Self {
            columns,
            max_votes_per_card: DEFAULT_MAX_VOTES_PER_CARD,
            max_votes_per_user: DEFAULT_MAX_VOTES_PER_USER,
            hide_author: false,
            hide_cards_initially: false,
            hide_vote_reactions: false,
        }
    }

    pub fn with_vote_limits(mut self, per_card: u32, per_user: u32) -> Self {
        self.max_votes_per_card = per_card;
        self.max_votes_per_user = per_user;
        self
    }

    pub fn column(&self, key: &str) -> Option<&ColumnTemplate> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn validate(&self) -> RetroResult<()> {
        if self.columns.is_empty() {
            return Err(RetroError::Validation(
                "template needs at least one column".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.key.is_empty() {
                return Err(RetroError::Validation(format!(
                    "column name '{}' has no usable characters",
                    column.name
                )));
            }
            if !seen.insert(column.key.as_str()) {
                return Err(RetroError::Validation(format!(
                    "duplicate column key '{}'",
                    column.key
                )));
            }
        }
        if self.max_votes_per_card == 0 || self.max_votes_per_user == 0 {
            return Err(RetroError::Validation(
                "vote limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply the template part of a partial update. The timer is board state
    /// and is handled by the caller.
    pub fn update(&mut self, updates: &TemplateUpdate) {
        if let Some(ref columns) = updates.columns {
            self.columns = columns.clone();
        }
        if let Some(per_card) = updates.max_votes_per_card {
            self.max_votes_per_card = per_card;
        }
        if let Some(per_user) = updates.max_votes_per_user {
            self.max_votes_per_user = per_user;
        }
        if let Some(hide_author) = updates.hide_author {
            self.hide_author = hide_author;
        }
        if let Some(hide_cards) = updates.hide_cards_initially {
            self.hide_cards_initially = hide_cards;
        }
        if let Some(hide_votes) = updates.hide_vote_reactions {
            self.hide_vote_reactions = hide_votes;
        }
    }
}

/// Partial update for a board's template and countdown timer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateUpdate {
    pub columns: Option<Vec<ColumnTemplate>>,
    pub max_votes_per_card: Option<u32>,
    pub max_votes_per_user: Option<u32>,
    pub hide_author: Option<bool>,
    pub hide_cards_initially: Option<bool>,
    pub hide_vote_reactions: Option<bool>,
    /// `Set` arms the countdown with a new expiry, `Clear` stops it.
    pub timer: FieldUpdate<DateTime<Utc>>,
}

impl TemplateUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        Template::new(ColumnTemplate::from_names(["Went Well", "To Improve"]))
    }

    #[test]
    fn test_validate_ok() {
        assert!(template().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_keys() {
        let t = Template::new(ColumnTemplate::from_names(["Went Well", "went  well"]));
        assert!(matches!(t.validate(), Err(RetroError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let t = template().with_vote_limits(0, 3);
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_columns() {
        assert!(Template::new(vec![]).validate().is_err());
        let t = Template::new(ColumnTemplate::from_names(["!!!"]));
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_partial_update() {
        let mut t = template();
        t.update(&TemplateUpdate {
            max_votes_per_user: Some(9),
            hide_author: Some(true),
            ..Default::default()
        });
        assert_eq!(t.max_votes_per_user, 9);
        assert_eq!(t.max_votes_per_card, DEFAULT_MAX_VOTES_PER_CARD);
        assert!(t.hide_author);
        assert!(!t.hide_vote_reactions);
    }

    #[test]
    fn test_empty_update() {
        assert!(TemplateUpdate::default().is_empty());
        let update = TemplateUpdate {
            timer: FieldUpdate::Clear,
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
