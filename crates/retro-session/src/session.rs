use crate::countdown::Countdown;
use crate::debounce::Debouncer;
use crate::notification::Notification;
use crate::reconciler::{Commit, RealtimeReconciler, ReconcileState, RemoteOutcome};
use chrono::{DateTime, Utc};
use retro_core::{AppConfig, ReconcilePolicy, RetroError, RetroResult};
use retro_domain::{
    eligibility, resolve_drop_slot, Board, BoardId, BoardView, Card, CardId, CardRef, ColumnKey,
    CommandOutcome, Eligibility, Intent, MutationEngine, Owner, TemplateUpdate,
};
use retro_persistence::{PersistenceGateway, Subscription, SubscriptionFilter};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub merge_separator: String,
    pub reconcile_policy: ReconcilePolicy,
    /// Quiet period before a text draft is committed
    pub text_debounce: Duration,
}

impl SessionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            merge_separator: config.effective_merge_separator().to_string(),
            reconcile_policy: config.effective_reconcile_policy(),
            text_debounce: Duration::from_millis(config.effective_text_debounce_ms()),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

/// Handle on one queued save. Dropping it does not cancel the save.
#[derive(Debug)]
pub struct SaveTicket {
    revision: u64,
    reply: oneshot::Receiver<RetroResult<()>>,
}

impl SaveTicket {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub async fn wait(self) -> RetroResult<()> {
        match self.reply.await {
            Ok(result) => result,
            Err(_) => Err(RetroError::Persistence(format!(
                "save of revision {} was dropped",
                self.revision
            ))),
        }
    }
}

/// Outcome of a user command plus the save it triggered, if any
#[derive(Debug)]
pub struct Committed {
    pub outcome: CommandOutcome,
    pub ticket: Option<SaveTicket>,
}

impl Committed {
    /// Wait for the save to resolve and return the command outcome
    pub async fn saved(self) -> RetroResult<CommandOutcome> {
        if let Some(ticket) = self.ticket {
            ticket.wait().await?;
        }
        Ok(self.outcome)
    }
}

/// A merge awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeProposal {
    pub origin: CardRef,
    pub target: CardRef,
}

impl MergeProposal {
    pub fn is_same_column(&self) -> bool {
        self.origin.column == self.target.column
    }

    pub fn intent(&self) -> Intent {
        if self.is_same_column() {
            Intent::MergeSameColumn {
                origin: self.origin.card_id,
                target: self.target.card_id,
            }
        } else {
            Intent::MergeCrossColumn {
                origin: self.origin.clone(),
                target: self.target.clone(),
            }
        }
    }
}

/// What a single `next_event` step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Remote(RemoteOutcome),
    Saved { revision: u64 },
    SaveFailed { revision: u64, message: String },
    TimerExpired,
    TextCommitted {
        card_id: CardId,
        outcome: CommandOutcome,
    },
    /// The snapshot feed closed; no more remote snapshots will arrive
    Disconnected,
}

struct SaveRequest {
    board_id: BoardId,
    snapshot: Board,
    reply: oneshot::Sender<RetroResult<()>>,
}

struct SaveAck {
    revision: u64,
    error: Option<String>,
}

enum Ready {
    Remote(Option<Board>),
    Ack(Option<SaveAck>),
    Expired(DateTime<Utc>),
    Draft(CardId, String),
}

/// One user's live view of one board.
///
/// Commands apply to the local board immediately and queue a save of the
/// whole snapshot. Remote snapshots, save results, countdown expiry and
/// debounced text drafts are applied by `next_event`, one at a time.
pub struct BoardSession {
    board_id: BoardId,
    user: Owner,
    reconciler: RealtimeReconciler,
    subscription: Option<Subscription>,
    save_tx: Option<mpsc::UnboundedSender<SaveRequest>>,
    ack_rx: mpsc::UnboundedReceiver<SaveAck>,
    worker: Option<JoinHandle<()>>,
    notifications: mpsc::UnboundedSender<Notification>,
    countdown: Countdown,
    drafts: Debouncer<CardId, String>,
    proposal: Option<MergeProposal>,
}

impl BoardSession {
    /// Load a board and subscribe to its snapshot feed.
    ///
    /// Returns the session and the receiver for user-facing notifications.
    pub async fn load(
        gateway: Arc<dyn PersistenceGateway>,
        board_id: BoardId,
        user: Owner,
        config: SessionConfig,
    ) -> RetroResult<(Self, mpsc::UnboundedReceiver<Notification>)> {
        // Subscribe before loading so nothing pushed in between is missed
        let subscription = gateway.subscribe(SubscriptionFilter::active(board_id));
        let board = gateway
            .get_by_id(board_id)
            .await?
            .ok_or_else(|| RetroError::NotFound(format!("Board {} not found", board_id)))?;
        tracing::info!("Opened session on board {} as {}", board_id, user.id);

        let mut countdown = Countdown::new();
        countdown.sync(&board.timer);

        let mut reconciler = RealtimeReconciler::new(
            MutationEngine::new(config.merge_separator),
            config.reconcile_policy,
        );
        reconciler.load(board);

        let (notifications, notification_rx) = mpsc::unbounded_channel();
        let (save_tx, save_rx) = mpsc::unbounded_channel();
        let (ack_tx, ack_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(save_worker(gateway, save_rx, ack_tx, notifications.clone()));

        let session = Self {
            board_id,
            user,
            reconciler,
            subscription: Some(subscription),
            save_tx: Some(save_tx),
            ack_rx,
            worker: Some(worker),
            notifications,
            countdown,
            drafts: Debouncer::new(config.text_debounce),
            proposal: None,
        };

        Ok((session, notification_rx))
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn user(&self) -> &Owner {
        &self.user
    }

    pub fn board(&self) -> Option<&Board> {
        self.reconciler.board()
    }

    pub fn state(&self) -> ReconcileState {
        self.reconciler.state()
    }

    pub fn pending_commits(&self) -> usize {
        self.reconciler.pending().len()
    }

    pub fn discarded_commits(&self) -> usize {
        self.reconciler.discarded_commits()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ReconcileState::Closed
    }

    /// The board as this session's user is allowed to see it
    pub fn view(&self) -> Option<BoardView> {
        self.board()
            .map(|board| BoardView::for_viewer(board, &self.user.id))
    }

    /// Whether this session's user may vote on a card right now
    pub fn eligibility(&self, card_id: CardId) -> Option<Eligibility> {
        let board = self.board()?;
        let card = board.card(card_id)?;
        Some(eligibility(board, card, &self.user.id))
    }

    pub fn countdown_expiry(&self) -> Option<DateTime<Utc>> {
        self.countdown.expiry()
    }

    pub fn reorder(
        &mut self,
        card_id: CardId,
        column: impl Into<ColumnKey>,
        target_index: usize,
    ) -> RetroResult<Committed> {
        self.run(Intent::Reorder {
            card_id,
            column: column.into(),
            target_index,
        })
    }

    /// Move a card to a drop slot. Slots count positions in the column as
    /// it was before the card was lifted; dropping it back into its own
    /// slot commits nothing.
    pub fn drop_card(
        &mut self,
        card_id: CardId,
        column: impl Into<ColumnKey>,
        slot: usize,
    ) -> RetroResult<Committed> {
        self.ensure_open()?;
        let column = column.into();
        let board = self
            .board()
            .ok_or_else(|| RetroError::Internal("board not loaded".to_string()))?;
        let target_index = resolve_drop_slot(board, card_id, &column, slot);

        let same_slot = board
            .locate(card_id)
            .is_some_and(|(current, index)| current == column && index == target_index);
        if same_slot {
            tracing::debug!("Card {} dropped into its own slot", card_id);
            return Ok(Committed {
                outcome: CommandOutcome::Unchanged,
                ticket: None,
            });
        }
        self.reorder(card_id, column, target_index)
    }

    pub fn favorite(&mut self, card_id: CardId) -> RetroResult<Committed> {
        let voter = self.user.id.clone();
        self.run(Intent::Favorite { card_id, voter })
    }

    pub fn unfavorite(&mut self, card_id: CardId) -> RetroResult<Committed> {
        let voter = self.user.id.clone();
        self.run(Intent::Unfavorite { card_id, voter })
    }

    /// Replace a card's text now, superseding any pending draft for it
    pub fn edit_text(&mut self, card_id: CardId, text: impl Into<String>) -> RetroResult<Committed> {
        self.ensure_open()?;
        self.drafts.cancel(&card_id);
        self.run(Intent::EditText {
            card_id,
            text: text.into(),
        })
    }

    /// Record a text draft; it is committed once the card has been quiet
    /// for the debounce window.
    pub fn draft_text(&mut self, card_id: CardId, text: impl Into<String>) -> RetroResult<()> {
        self.ensure_open()?;
        self.drafts.push(card_id, text.into());
        Ok(())
    }

    pub fn add_card(&mut self, card: Card) -> RetroResult<Committed> {
        self.run(Intent::AddCard(card))
    }

    /// Card owned by this session's user, ready for `add_card`
    pub fn new_card(
        &self,
        column: impl Into<ColumnKey>,
        text: impl Into<String>,
        color: impl Into<String>,
    ) -> Card {
        Card::new(self.user.clone(), column, text, color)
    }

    pub fn delete_card(&mut self, card_id: CardId) -> RetroResult<Committed> {
        self.ensure_open()?;
        self.drafts.cancel(&card_id);
        if self
            .proposal
            .as_ref()
            .is_some_and(|p| p.origin.card_id == card_id || p.target.card_id == card_id)
        {
            self.proposal = None;
        }
        self.run(Intent::DeleteCard(card_id))
    }

    /// First phase of a merge: record the pair for confirmation.
    pub fn propose_merge(&mut self, origin: CardId, target: CardId) -> RetroResult<MergeProposal> {
        self.ensure_open()?;
        let board = self
            .board()
            .ok_or_else(|| RetroError::Internal("board not loaded".to_string()))?;
        let locate = |card_id: CardId| {
            board
                .locate(card_id)
                .map(|(column, _)| CardRef { card_id, column })
                .ok_or_else(|| RetroError::NotFound(format!("Card {} not found", card_id)))
        };
        let proposal = MergeProposal {
            origin: locate(origin)?,
            target: locate(target)?,
        };

        tracing::debug!(
            "Proposed merge of {} ({}) into {} ({})",
            proposal.origin.card_id,
            proposal.origin.column,
            proposal.target.card_id,
            proposal.target.column
        );
        self.proposal = Some(proposal.clone());
        Ok(proposal)
    }

    pub fn pending_merge(&self) -> Option<&MergeProposal> {
        self.proposal.as_ref()
    }

    pub fn cancel_merge(&mut self) -> Option<MergeProposal> {
        self.proposal.take()
    }

    /// Second phase of a merge: execute the proposed pair.
    pub fn confirm_merge(&mut self) -> RetroResult<Committed> {
        self.ensure_open()?;
        let proposal = self
            .proposal
            .take()
            .ok_or_else(|| RetroError::Validation("No merge has been proposed".to_string()))?;

        let committed = self.run(proposal.intent())?;
        if committed.outcome.is_applied() {
            self.drafts.cancel(&proposal.origin.card_id);
        }
        Ok(committed)
    }

    pub fn update_template_config(&mut self, update: TemplateUpdate) -> RetroResult<Committed> {
        let committed = self.run(Intent::UpdateTemplate(update))?;
        if committed.outcome.is_applied() {
            self.sync_countdown();
        }
        Ok(committed)
    }

    pub fn archive(&mut self) -> RetroResult<Committed> {
        self.run(Intent::Archive)
    }

    /// Wait for the next remote snapshot, save result, countdown expiry or
    /// debounced draft, and apply it.
    pub async fn next_event(&mut self) -> RetroResult<SessionEvent> {
        self.ensure_open()?;

        let ready = tokio::select! {
            remote = next_remote(&mut self.subscription) => Ready::Remote(remote),
            ack = self.ack_rx.recv() => Ready::Ack(ack),
            expiry = self.countdown.expired() => Ready::Expired(expiry),
            (card_id, text) = self.drafts.next_ready() => Ready::Draft(card_id, text),
        };

        match ready {
            Ready::Remote(Some(snapshot)) => Ok(SessionEvent::Remote(self.receive_remote(snapshot))),
            Ready::Remote(None) => {
                tracing::warn!("Snapshot feed for board {} closed", self.board_id);
                self.subscription = None;
                Ok(SessionEvent::Disconnected)
            }
            Ready::Ack(Some(SaveAck { revision, error })) => {
                self.reconciler.acknowledge(revision);
                Ok(match error {
                    None => SessionEvent::Saved { revision },
                    Some(message) => SessionEvent::SaveFailed { revision, message },
                })
            }
            Ready::Ack(None) => Err(RetroError::Internal("save worker stopped".to_string())),
            Ready::Expired(expiry) => {
                tracing::info!("Countdown on board {} expired at {}", self.board_id, expiry);
                self.commit(Intent::StopTimer)?;
                self.notify(Notification::TimerExpired);
                Ok(SessionEvent::TimerExpired)
            }
            Ready::Draft(card_id, text) => {
                let committed = self.run(Intent::EditText { card_id, text })?;
                Ok(SessionEvent::TextCommitted {
                    card_id,
                    outcome: committed.outcome,
                })
            }
        }
    }

    /// Unsubscribe and stop reacting to anything. Queued saves still run.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.countdown.cancel();
        if !self.drafts.is_empty() {
            tracing::debug!("Dropping {} uncommitted text draft(s)", self.drafts.len());
        }
        self.drafts.cancel_all();
        self.proposal = None;
        self.save_tx = None;
        self.reconciler.close();
        tracing::info!("Closed session on board {}", self.board_id);
    }

    /// Close and wait for the save worker to drain its queue
    pub async fn shutdown(mut self) -> RetroResult<()> {
        self.close();
        if let Some(worker) = self.worker.take() {
            worker
                .await
                .map_err(|e| RetroError::Internal(format!("save worker failed: {}", e)))?;
        }
        Ok(())
    }

    fn ensure_open(&self) -> RetroResult<()> {
        if self.is_closed() {
            return Err(RetroError::SessionClosed(self.board_id.to_string()));
        }
        Ok(())
    }

    /// Commit a user command and report its outcome
    fn run(&mut self, intent: Intent) -> RetroResult<Committed> {
        let committed = self.commit(intent)?;
        if let Some(notification) = Notification::for_outcome(&committed.outcome) {
            self.notify(notification);
        }
        Ok(committed)
    }

    fn commit(&mut self, intent: Intent) -> RetroResult<Committed> {
        let Commit { outcome, snapshot } = self.reconciler.commit(intent)?;
        let ticket = snapshot.map(|snapshot| self.queue_save(snapshot));
        Ok(Committed { outcome, ticket })
    }

    fn receive_remote(&mut self, snapshot: Board) -> RemoteOutcome {
        let outcome = self.reconciler.receive_remote(snapshot);
        match outcome {
            RemoteOutcome::Replayed { replayed } => {
                tracing::info!("Replayed {} local commit(s) onto remote snapshot", replayed);
                if let Some(board) = self.reconciler.board().cloned() {
                    // The result arrives as a Saved or SaveFailed event
                    let ticket = self.queue_save(board);
                    tracing::debug!("Re-saving replayed revision {}", ticket.revision());
                }
                self.sync_countdown();
            }
            RemoteOutcome::Replaced { .. } => self.sync_countdown(),
            RemoteOutcome::Current | RemoteOutcome::Ignored => {}
        }
        outcome
    }

    fn sync_countdown(&mut self) {
        if let Some(board) = self.reconciler.board() {
            self.countdown.sync(&board.timer);
        }
    }

    fn queue_save(&self, snapshot: Board) -> SaveTicket {
        let revision = snapshot.revision;
        let (reply, rx) = oneshot::channel();

        if let Some(ref tx) = self.save_tx {
            tracing::debug!("Queueing revision {} for save", revision);
            let request = SaveRequest {
                board_id: self.board_id,
                snapshot,
                reply,
            };
            if tx.send(request).is_err() {
                tracing::error!("Failed to queue save of revision {}: worker stopped", revision);
            }
        } else {
            tracing::debug!("No save channel available - skipping save");
        }

        SaveTicket { revision, reply: rx }
    }

    fn notify(&self, notification: Notification) {
        if self.notifications.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}

async fn next_remote(subscription: &mut Option<Subscription>) -> Option<Board> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

/// Performs queued saves one at a time, in commit order.
async fn save_worker(
    gateway: Arc<dyn PersistenceGateway>,
    mut requests: mpsc::UnboundedReceiver<SaveRequest>,
    acks: mpsc::UnboundedSender<SaveAck>,
    notifications: mpsc::UnboundedSender<Notification>,
) {
    while let Some(request) = requests.recv().await {
        let revision = request.snapshot.revision;
        let result = match gateway.save(request.board_id, &request.snapshot).await {
            Ok(()) => {
                tracing::debug!("Saved board {} revision {}", request.board_id, revision);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    "Failed to save board {} revision {}: {}",
                    request.board_id,
                    revision,
                    e
                );
                let message = match e {
                    RetroError::Persistence(message) => message,
                    other => other.to_string(),
                };
                let _ = notifications.send(Notification::PersistenceError {
                    message: message.clone(),
                });
                Err(message)
            }
        };

        let _ = acks.send(SaveAck {
            revision,
            error: result.as_ref().err().cloned(),
        });
        let _ = request.reply.send(result.map_err(RetroError::Persistence));
    }
    tracing::debug!("Save worker finished");
}
