pub mod countdown;
pub mod debounce;
pub mod notification;
pub mod reconciler;
pub mod session;

pub use countdown::Countdown;
pub use debounce::Debouncer;
pub use notification::Notification;
pub use reconciler::{Commit, PendingCommit, RealtimeReconciler, ReconcileState, RemoteOutcome};
pub use session::{
    BoardSession, Committed, MergeProposal, SaveTicket, SessionConfig, SessionEvent,
};
