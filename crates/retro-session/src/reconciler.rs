use retro_core::{ReconcilePolicy, RetroError, RetroResult};
use retro_domain::{Board, CommandOutcome, Intent, MutationEngine};
use std::collections::VecDeque;

/// Acknowledged snapshots kept around to recognise their late echoes
const SETTLED_LIMIT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    Loading,
    Synced,
    /// Local commits are waiting for their save to resolve
    Committing,
    ReceivingRemote,
    Closed,
}

/// A local commit whose save has not resolved yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    pub revision: u64,
    pub intent: Intent,
    /// The board this commit handed to the save queue
    pub snapshot: Board,
}

/// Result of a local commit. `snapshot` is the document to save, present
/// only when the intent changed the board.
#[derive(Debug, Clone)]
pub struct Commit {
    pub outcome: CommandOutcome,
    pub snapshot: Option<Board>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// Local state replaced; `discarded` local commits were overwritten
    Replaced { discarded: usize },
    /// Local state replaced and `replayed` pending commits re-applied on top
    Replayed { replayed: usize },
    /// Snapshot is local state or an echo of one of our own saves
    Current,
    /// Snapshot was not applied
    Ignored,
}

/// Owns the authoritative local board and decides how remote snapshots
/// land on top of optimistic local commits.
pub struct RealtimeReconciler {
    engine: MutationEngine,
    policy: ReconcilePolicy,
    state: ReconcileState,
    board: Option<Board>,
    pending: Vec<PendingCommit>,
    settled: VecDeque<Board>,
    discarded: usize,
}

impl RealtimeReconciler {
    pub fn new(engine: MutationEngine, policy: ReconcilePolicy) -> Self {
        Self {
            engine,
            policy,
            state: ReconcileState::Loading,
            board: None,
            pending: Vec::new(),
            settled: VecDeque::new(),
            discarded: 0,
        }
    }

    pub fn load(&mut self, board: Board) {
        tracing::info!("Loaded board {} at revision {}", board.id, board.revision);
        self.board = Some(board);
        self.pending.clear();
        self.settled.clear();
        self.state = ReconcileState::Synced;
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    pub fn engine(&self) -> &MutationEngine {
        &self.engine
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn pending(&self) -> &[PendingCommit] {
        &self.pending
    }

    /// Local commits overwritten by remote snapshots so far
    pub fn discarded_commits(&self) -> usize {
        self.discarded
    }

    /// Apply an intent optimistically. The new board replaces local state
    /// right away; saving it is the caller's job.
    pub fn commit(&mut self, intent: Intent) -> RetroResult<Commit> {
        let board = match (self.state, self.board.as_ref()) {
            (ReconcileState::Closed, board) => {
                let board_id = board.map(|b| b.id.to_string()).unwrap_or_default();
                return Err(RetroError::SessionClosed(board_id));
            }
            (_, Some(board)) => board,
            (_, None) => {
                return Err(RetroError::Internal(
                    "cannot commit before the board is loaded".to_string(),
                ))
            }
        };

        let mutation = self.engine.apply(board, &intent);
        if !mutation.outcome.is_applied() {
            return Ok(Commit {
                outcome: mutation.outcome,
                snapshot: None,
            });
        }

        let snapshot = mutation.board;
        self.pending.push(PendingCommit {
            revision: snapshot.revision,
            intent,
            snapshot: snapshot.clone(),
        });
        self.board = Some(snapshot.clone());
        self.state = ReconcileState::Committing;

        Ok(Commit {
            outcome: mutation.outcome,
            snapshot: Some(snapshot),
        })
    }

    /// A save up to `revision` resolved, successfully or not. Failed saves
    /// are not retried, so they stop being pending as well.
    pub fn acknowledge(&mut self, revision: u64) {
        let (settled, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|commit| commit.revision <= revision);
        self.pending = pending;
        for commit in settled {
            if self.settled.len() == SETTLED_LIMIT {
                self.settled.pop_front();
            }
            self.settled.push_back(commit.snapshot);
        }
        if self.pending.is_empty() && self.state == ReconcileState::Committing {
            self.state = ReconcileState::Synced;
        }
    }

    pub fn receive_remote(&mut self, snapshot: Board) -> RemoteOutcome {
        if self.state == ReconcileState::Closed {
            return RemoteOutcome::Ignored;
        }
        if let Some(local) = self.board.as_ref() {
            if local.id != snapshot.id {
                tracing::warn!("Ignoring snapshot for foreign board {}", snapshot.id);
                return RemoteOutcome::Ignored;
            }
        }
        if self.board.as_ref() == Some(&snapshot) || self.is_own_save(&snapshot) {
            tracing::debug!("Snapshot at revision {} is our own save", snapshot.revision);
            self.acknowledge(snapshot.revision);
            self.settled.retain(|board| board.revision > snapshot.revision);
            return RemoteOutcome::Current;
        }

        let resume = self.state;
        self.state = ReconcileState::ReceivingRemote;

        let outcome = match self.policy {
            ReconcilePolicy::LastSnapshotWins => self.replace(snapshot),
            ReconcilePolicy::NewerRevisionOnly => self.replay_onto(snapshot),
        };

        self.state = match outcome {
            RemoteOutcome::Ignored => resume,
            _ if self.pending.is_empty() => ReconcileState::Synced,
            _ => ReconcileState::Committing,
        };
        outcome
    }

    /// Gateways echo every save back to its subscribers, including ours.
    /// Those echoes may trail local state by several commits.
    fn is_own_save(&self, snapshot: &Board) -> bool {
        self.pending.iter().any(|commit| commit.snapshot == *snapshot)
            || self.settled.iter().any(|board| board == snapshot)
    }

    fn replace(&mut self, snapshot: Board) -> RemoteOutcome {
        let discarded = self.pending.len();
        if discarded > 0 {
            tracing::warn!(
                "Remote snapshot at revision {} overwrote {} unsaved local commit(s)",
                snapshot.revision,
                discarded
            );
        }
        self.pending.clear();
        self.discarded += discarded;
        self.board = Some(snapshot);
        RemoteOutcome::Replaced { discarded }
    }

    fn replay_onto(&mut self, snapshot: Board) -> RemoteOutcome {
        if let Some(local) = self.board.as_ref() {
            if snapshot.revision <= local.revision {
                tracing::debug!(
                    "Ignoring remote revision {} (local is at {})",
                    snapshot.revision,
                    local.revision
                );
                return RemoteOutcome::Ignored;
            }
        }

        let outstanding = std::mem::take(&mut self.pending);
        let mut board = snapshot;
        let mut replayed = 0;
        for commit in outstanding {
            let mutation = self.engine.apply(&board, &commit.intent);
            if mutation.outcome.is_applied() {
                board = mutation.board;
                self.pending.push(PendingCommit {
                    revision: board.revision,
                    intent: commit.intent,
                    snapshot: board.clone(),
                });
                replayed += 1;
            } else {
                tracing::warn!(
                    "Dropped local commit at revision {} during replay: {:?}",
                    commit.revision,
                    mutation.outcome
                );
                self.discarded += 1;
            }
        }
        self.board = Some(board);

        if replayed > 0 {
            RemoteOutcome::Replayed { replayed }
        } else {
            RemoteOutcome::Replaced { discarded: 0 }
        }
    }

    /// Stop reconciling. Saves already handed to the gateway still finish.
    pub fn close(&mut self) {
        self.state = ReconcileState::Closed;
    }
}
