use retro_domain::{CommandOutcome, RejectReason};
use serde::{Deserialize, Serialize};

/// Outcome notices for whoever shows toasts to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notification {
    Success,
    MaxPerCard,
    MaxPerUser,
    PersistenceError { message: String },
    #[serde(rename = "expired")]
    TimerExpired,
}

impl Notification {
    /// Notice for a command outcome. Unchanged commands and invalid
    /// merges or templates are reported through the returned outcome only.
    pub fn for_outcome(outcome: &CommandOutcome) -> Option<Self> {
        match outcome {
            CommandOutcome::Applied => Some(Notification::Success),
            CommandOutcome::Rejected(RejectReason::MaxPerCard) => Some(Notification::MaxPerCard),
            CommandOutcome::Rejected(RejectReason::MaxPerUser) => Some(Notification::MaxPerUser),
            CommandOutcome::Rejected(_) | CommandOutcome::Unchanged => None,
        }
    }
}
