use crate::store::atomic_writer::AtomicWriter;
use crate::subscription::{Subscription, SubscriptionFilter};
use crate::traits::{ChangeDetector, PersistenceGateway, PersistenceMetadata};
use crate::watch::BoardWatcher;
use parking_lot::Mutex;
use retro_core::{RetroError, RetroResult};
use retro_domain::{Board, BoardId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use uuid::Uuid;

pub const FORMAT_VERSION: u32 = 1;
const FEED_CAPACITY: usize = 64;

/// On-disk format of one board file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub board: Board,
}

impl JsonEnvelope {
    pub fn new(board: Board, instance_id: Uuid) -> Self {
        Self {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(FORMAT_VERSION, instance_id, board.revision),
            board,
        }
    }

    pub fn from_slice(bytes: &[u8]) -> RetroResult<Self> {
        let envelope: Self = serde_json::from_slice(bytes)
            .map_err(|e| RetroError::Serialization(e.to_string()))?;
        if envelope.version != FORMAT_VERSION {
            return Err(RetroError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }
        Ok(envelope)
    }

    pub fn to_vec(&self) -> RetroResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| RetroError::Serialization(e.to_string()))
    }
}

/// Directory of `<board-id>.json` files.
///
/// Saves from this instance are pushed to subscribers directly. Changes made
/// by other processes reach subscribers once `watch` has been started.
pub struct JsonFileGateway {
    dir: PathBuf,
    instance_id: Uuid,
    feed: broadcast::Sender<Board>,
    watcher: BoardWatcher,
    forwarder: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl JsonFileGateway {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_instance_id(dir, Uuid::new_v4())
    }

    /// Create a gateway with a fixed instance ID (useful for testing)
    pub fn with_instance_id(dir: impl AsRef<Path>, instance_id: Uuid) -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            dir: dir.as_ref().to_path_buf(),
            instance_id,
            feed,
            watcher: BoardWatcher::new(),
            forwarder: Mutex::new(None),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, board_id: BoardId) -> PathBuf {
        board_path(&self.dir, board_id)
    }

    /// Forward board files changed by other instances into the feed.
    pub async fn watch(&self) -> RetroResult<()> {
        let mut changes = self.watcher.subscribe();
        self.watcher.start_watching(self.dir.clone()).await?;

        let feed = self.feed.clone();
        let own_instance = self.instance_id;
        let handle = tokio::spawn(async move {
            loop {
                let change = match changes.recv().await {
                    Ok(change) => change,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Dropped {} board change events", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                match read_envelope(&change.path).await {
                    Ok(Some(envelope)) if envelope.metadata.instance_id != own_instance => {
                        tracing::debug!(
                            "External change to board {} (revision {})",
                            change.board_id,
                            envelope.board.revision
                        );
                        let _ = feed.send(envelope.board);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Ignoring unreadable board file {}: {}", change.path.display(), e);
                    }
                }
            }
        });

        if let Some(previous) = self.forwarder.lock().replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    pub async fn unwatch(&self) -> RetroResult<()> {
        let handle = self.forwarder.lock().take();
        if let Some(handle) = handle {
            handle.abort();
        }
        self.watcher.stop_watching().await
    }
}

fn board_path(dir: &Path, board_id: BoardId) -> PathBuf {
    dir.join(format!("{}.json", board_id))
}

async fn read_envelope(path: &Path) -> RetroResult<Option<JsonEnvelope>> {
    match AtomicWriter::read_optional(path).await? {
        Some(bytes) => JsonEnvelope::from_slice(&bytes).map(Some),
        None => Ok(None),
    }
}

#[async_trait::async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn get_by_id(&self, board_id: BoardId) -> RetroResult<Option<Board>> {
        let envelope = read_envelope(&self.path_for(board_id)).await?;
        if let Some(ref envelope) = envelope {
            tracing::info!(
                "Loaded board {} revision {} (saved {})",
                board_id,
                envelope.board.revision,
                envelope.metadata.saved_at
            );
        }
        Ok(envelope.map(|e| e.board))
    }

    async fn save(&self, board_id: BoardId, snapshot: &Board) -> RetroResult<()> {
        if snapshot.id != board_id {
            return Err(RetroError::Validation(format!(
                "snapshot {} saved under board id {}",
                snapshot.id, board_id
            )));
        }
        let envelope = JsonEnvelope::new(snapshot.clone(), self.instance_id);
        let bytes = envelope.to_vec()?;
        let path = self.path_for(board_id);

        AtomicWriter::write_atomic(&path, &bytes).await?;
        tracing::info!("Saved {} bytes to {}", bytes.len(), path.display());

        let _ = self.feed.send(envelope.board);
        Ok(())
    }

    fn subscribe(&self, filter: SubscriptionFilter) -> Subscription {
        Subscription::new(self.feed.subscribe(), filter)
    }
}

impl Drop for JsonFileGateway {
    fn drop(&mut self) {
        if let Some(handle) = self.forwarder.lock().take() {
            handle.abort();
        }
    }
}
