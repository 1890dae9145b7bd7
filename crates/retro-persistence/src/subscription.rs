use retro_domain::{Board, BoardId, BoardStatus};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Which pushed snapshots a subscriber receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub board_id: BoardId,
    pub status: BoardStatus,
}

impl SubscriptionFilter {
    /// Snapshots of one board while it is active
    pub fn active(board_id: BoardId) -> Self {
        Self {
            board_id,
            status: BoardStatus::Active,
        }
    }

    pub fn matches(&self, board: &Board) -> bool {
        board.id == self.board_id && board.status == self.status
    }
}

/// Receiving end of a gateway's snapshot feed.
///
/// Dropping the subscription (or calling `unsubscribe`) stops delivery.
pub struct Subscription {
    rx: broadcast::Receiver<Board>,
    filter: SubscriptionFilter,
}

impl Subscription {
    pub fn new(rx: broadcast::Receiver<Board>, filter: SubscriptionFilter) -> Self {
        Self { rx, filter }
    }

    pub fn filter(&self) -> SubscriptionFilter {
        self.filter
    }

    /// Next matching snapshot, `None` once the feed is closed.
    ///
    /// Snapshots dropped because the receiver lagged are skipped; each
    /// snapshot is a full document so only the latest matters.
    pub async fn next(&mut self) -> Option<Board> {
        loop {
            match self.rx.recv().await {
                Ok(board) if self.filter.matches(&board) => return Some(board),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "Subscription for board {} lagged, skipped {} snapshots",
                        self.filter.board_id,
                        skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {
        tracing::info!("Unsubscribed from board {}", self.filter.board_id);
    }
}
