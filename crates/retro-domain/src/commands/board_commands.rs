use super::{Command, CommandOutcome, RejectReason};
use crate::board::{Board, BoardStatus};
use crate::field_update::FieldUpdate;
use crate::template::TemplateUpdate;

/// Update template configuration and (re-)arm or stop the countdown.
///
/// New columns get empty sequences. Existing sequences are never rekeyed or
/// dropped, even when their column disappears from the template.
pub struct UpdateTemplate {
    pub updates: TemplateUpdate,
}

impl Command for UpdateTemplate {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        if self.updates.is_empty() {
            return CommandOutcome::Unchanged;
        }

        let mut template = board.template.clone();
        template.update(&self.updates);
        if let Err(e) = template.validate() {
            tracing::debug!("Template update rejected: {}", e);
            return CommandOutcome::Rejected(RejectReason::InvalidTemplate);
        }
        board.template = template;
        board.ensure_columns();

        match self.updates.timer {
            FieldUpdate::Set(expiry) => board.timer.arm(expiry),
            FieldUpdate::Clear => board.timer.clear(),
            FieldUpdate::NoChange => {}
        }
        CommandOutcome::Applied
    }

    fn description(&self) -> String {
        "Update template".to_string()
    }
}

/// Flip the board to archived. Boards are never deleted.
pub struct ArchiveBoard;

impl Command for ArchiveBoard {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        if board.status == BoardStatus::Archived {
            return CommandOutcome::Unchanged;
        }
        board.status = BoardStatus::Archived;
        CommandOutcome::Applied
    }

    fn description(&self) -> String {
        "Archive board".to_string()
    }
}

/// Clear the countdown after it expired
pub struct StopTimer;

impl Command for StopTimer {
    fn execute(&self, board: &mut Board) -> CommandOutcome {
        if !board.timer.running && board.timer.expiry_date.is_none() {
            return CommandOutcome::Unchanged;
        }
        board.timer.clear();
        CommandOutcome::Applied
    }

    fn description(&self) -> String {
        "Stop timer".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Owner};
    use crate::column::ColumnTemplate;
    use crate::template::Template;
    use chrono::{Duration, Utc};

    fn board() -> Board {
        let template = Template::new(ColumnTemplate::from_names(["Went Well", "To Improve"]));
        let mut board = Board::from_template("b", "t", template).unwrap();
        let card = Card::new(Owner::new("u", "U"), "went-well", "x", "#fff");
        board.columns.get_mut("went-well").unwrap().push(card);
        board
    }

    #[test]
    fn test_update_limits() {
        let mut board = board();
        let outcome = UpdateTemplate {
            updates: TemplateUpdate {
                max_votes_per_card: Some(3),
                ..Default::default()
            },
        }
        .execute(&mut board);
        assert_eq!(outcome, CommandOutcome::Applied);
        assert_eq!(board.template.max_votes_per_card, 3);
    }

    #[test]
    fn test_rename_column_does_not_rekey_cards() {
        let mut board = board();
        let outcome = UpdateTemplate {
            updates: TemplateUpdate {
                columns: Some(ColumnTemplate::from_names(["Good Things", "To Improve"])),
                ..Default::default()
            },
        }
        .execute(&mut board);
        assert_eq!(outcome, CommandOutcome::Applied);
        assert_eq!(board.column("went-well").unwrap().len(), 1);
        assert!(board.column("good-things").unwrap().is_empty());
        assert_eq!(board.orphaned_columns(), vec!["went-well"]);
    }

    #[test]
    fn test_invalid_update_rejected() {
        let mut board = board();
        let before = board.clone();
        let outcome = UpdateTemplate {
            updates: TemplateUpdate {
                max_votes_per_user: Some(0),
                ..Default::default()
            },
        }
        .execute(&mut board);
        assert_eq!(outcome, CommandOutcome::Rejected(RejectReason::InvalidTemplate));
        assert_eq!(board, before);
    }

    #[test]
    fn test_timer_arm_and_clear() {
        let mut board = board();
        let expiry = Utc::now() + Duration::minutes(5);
        UpdateTemplate {
            updates: TemplateUpdate {
                timer: FieldUpdate::Set(expiry),
                ..Default::default()
            },
        }
        .execute(&mut board);
        assert_eq!(board.timer.active_expiry(), Some(expiry));

        assert_eq!(StopTimer.execute(&mut board), CommandOutcome::Applied);
        assert_eq!(board.timer.active_expiry(), None);
        assert_eq!(StopTimer.execute(&mut board), CommandOutcome::Unchanged);
    }

    #[test]
    fn test_archive_once() {
        let mut board = board();
        assert_eq!(ArchiveBoard.execute(&mut board), CommandOutcome::Applied);
        assert!(!board.is_active());
        assert_eq!(ArchiveBoard.execute(&mut board), CommandOutcome::Unchanged);
    }
}
