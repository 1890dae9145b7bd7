use async_trait::async_trait;
use parking_lot::Mutex;
use retro_core::{RetroError, RetroResult};
use retro_domain::{Board, BoardId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{broadcast, watch};

use crate::subscription::{Subscription, SubscriptionFilter};
use crate::traits::PersistenceGateway;

const FEED_CAPACITY: usize = 64;

/// In-process gateway: a board map plus a broadcast feed.
///
/// Saves can be paused (they stay pending until resumed) and a failure can be
/// injected for the next save, which lets callers exercise in-flight and
/// rejected saves.
pub struct MemoryGateway {
    boards: Mutex<HashMap<BoardId, Board>>,
    feed: broadcast::Sender<Board>,
    paused: watch::Sender<bool>,
    fail_next: Mutex<Option<String>>,
    saves: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        let (paused, _) = watch::channel(false);
        Self {
            boards: Mutex::new(HashMap::new()),
            feed,
            paused,
            fail_next: Mutex::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn with_board(board: Board) -> Self {
        let gateway = Self::new();
        gateway.boards.lock().insert(board.id, board);
        gateway
    }

    /// Store and push a snapshot as if another client had saved it.
    pub fn push_remote(&self, board: Board) {
        self.boards.lock().insert(board.id, board.clone());
        let _ = self.feed.send(board);
    }

    pub fn stored(&self, board_id: BoardId) -> Option<Board> {
        self.boards.lock().get(&board_id).cloned()
    }

    /// Completed saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn pause_saves(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume_saves(&self) {
        self.paused.send_replace(false);
    }

    pub fn fail_next_save(&self, message: impl Into<String>) {
        *self.fail_next.lock() = Some(message.into());
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn get_by_id(&self, board_id: BoardId) -> RetroResult<Option<Board>> {
        Ok(self.stored(board_id))
    }

    async fn save(&self, board_id: BoardId, snapshot: &Board) -> RetroResult<()> {
        let mut paused = self.paused.subscribe();
        if paused.wait_for(|is_paused| !is_paused).await.is_err() {
            return Err(RetroError::Persistence("gateway shut down".to_string()));
        }

        if let Some(message) = self.fail_next.lock().take() {
            return Err(RetroError::Persistence(message));
        }

        self.boards.lock().insert(board_id, snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        let _ = self.feed.send(snapshot.clone());
        tracing::debug!("Saved board {} revision {}", board_id, snapshot.revision);
        Ok(())
    }

    fn subscribe(&self, filter: SubscriptionFilter) -> Subscription {
        Subscription::new(self.feed.subscribe(), filter)
    }
}
