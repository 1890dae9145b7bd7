use crate::traits::{BoardChange, ChangeDetector};
use notify::{EventKind, RecursiveMode, Watcher};
use retro_core::RetroResult;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::Mutex;

/// Watches a board directory and reports which board files changed.
///
/// Atomic saves show up as create or rename events on `<board-id>.json`, so
/// any create or modify event on a board file counts as a change.
pub struct BoardWatcher {
    tx: broadcast::Sender<BoardChange>,
    task_handle: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    watching: Arc<AtomicBool>,
}

impl BoardWatcher {
    /// The broadcast channel has a buffer size of 32
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(32);
        Self {
            tx,
            task_handle: Arc::new(Mutex::new(None)),
            watching: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for BoardWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChangeDetector for BoardWatcher {
    async fn start_watching(&self, dir: PathBuf) -> RetroResult<()> {
        tokio::fs::create_dir_all(&dir).await?;
        // Canonicalize so the path matches OS event paths
        let watch_dir = tokio::fs::canonicalize(&dir).await?;
        let tx = self.tx.clone();
        let watching = self.watching.clone();

        let handle = tokio::spawn(async move {
            let handler = move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        return;
                    }
                    for change in event.paths.iter().filter_map(|p| BoardChange::from_path(p)) {
                        let _ = tx.send(change);
                    }
                }
                Err(e) => {
                    tracing::warn!("Board watcher error: {}", e);
                }
            };

            match notify::recommended_watcher(handler) {
                Ok(mut watcher) => {
                    if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
                        tracing::error!("Failed to watch board directory: {}", e);
                    } else {
                        tracing::info!("Started watching board directory: {}", watch_dir.display());
                        watching.store(true, Ordering::SeqCst);
                        // Keep watcher alive until the task is aborted
                        std::future::pending::<()>().await;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to create board watcher: {}", e);
                }
            }
        });

        let mut guard = self.task_handle.lock().await;
        if let Some(previous) = guard.replace(handle) {
            previous.abort();
        }

        Ok(())
    }

    async fn stop_watching(&self) -> RetroResult<()> {
        let mut guard = self.task_handle.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
            tracing::info!("Stopped board watching");
        }
        self.watching.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<BoardChange> {
        self.tx.subscribe()
    }

    fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }
}
