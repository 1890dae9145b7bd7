use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retro_core::RetroResult;
use retro_domain::{Board, BoardId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::subscription::{Subscription, SubscriptionFilter};

/// Metadata written alongside every stored snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the instance that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
    /// Board revision contained in the snapshot
    #[serde(default)]
    pub revision: u64,
}

impl PersistenceMetadata {
    pub fn new(format_version: u32, instance_id: Uuid, revision: u64) -> Self {
        Self {
            format_version,
            instance_id,
            saved_at: Utc::now(),
            revision,
        }
    }
}

/// Narrow storage contract the board engine talks to.
///
/// Saves are full-document overwrites. Subscriptions deliver whole snapshots
/// already filtered to one active board.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Load a snapshot, `None` when the board does not exist
    async fn get_by_id(&self, board_id: BoardId) -> RetroResult<Option<Board>>;

    /// Overwrite the stored snapshot
    async fn save(&self, board_id: BoardId, snapshot: &Board) -> RetroResult<()>;

    /// Start receiving pushed snapshots matching `filter`
    fn subscribe(&self, filter: SubscriptionFilter) -> Subscription;
}

/// Trait for detecting changes to board files written by other processes
#[async_trait]
pub trait ChangeDetector: Send + Sync {
    /// Start watching the directory for changes
    async fn start_watching(&self, dir: PathBuf) -> RetroResult<()>;

    /// Stop watching
    async fn stop_watching(&self) -> RetroResult<()>;

    /// Returns a broadcast receiver yielding a `BoardChange` per changed board file
    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<BoardChange>;

    /// Check if currently watching
    fn is_watching(&self) -> bool;
}

/// A board file changed on disk
#[derive(Debug, Clone)]
pub struct BoardChange {
    pub board_id: BoardId,
    pub path: PathBuf,
    pub detected_at: DateTime<Utc>,
}

impl BoardChange {
    /// Parse `<board-id>.json` into a change event.
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return None;
        }
        let board_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| Uuid::parse_str(s).ok())?;
        Some(Self {
            board_id,
            path: path.to_path_buf(),
            detected_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_change_from_path() {
        let id = Uuid::new_v4();
        let path = PathBuf::from(format!("/tmp/boards/{}.json", id));
        let change = BoardChange::from_path(&path).unwrap();
        assert_eq!(change.board_id, id);

        assert!(BoardChange::from_path(Path::new("/tmp/boards/notes.json")).is_none());
        assert!(BoardChange::from_path(&PathBuf::from(format!("/tmp/{}.tmp", id))).is_none());
    }
}
