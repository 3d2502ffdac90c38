//! Background snapshot flushing.

use super::{MatchStore, StoreError};
use crate::matches::Match;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, instrument, warn};

/// Feeds the latest snapshot of one room to the store without making the
/// room wait. Intermediate snapshots may be skipped; the newest always wins.
#[derive(Debug)]
pub struct SnapshotFlusher {
    tx: watch::Sender<Match>,
    task: JoinHandle<()>,
    store: Arc<dyn MatchStore>,
}

/// Starts a flusher for a room, beginning with `initial`.
pub fn spawn_flusher(store: Arc<dyn MatchStore>, initial: Match) -> SnapshotFlusher {
    let span = info_span!("flusher", match_id = %initial.id);
    let (tx, mut rx) = watch::channel(initial);
    rx.mark_changed();

    let task_store = Arc::clone(&store);
    let task = tokio::spawn(
        async move {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                match task_store.save(&snapshot).await {
                    Ok(()) => debug!(status = %snapshot.status, "Snapshot flushed"),
                    Err(e) => warn!(error = %e, "Snapshot flush failed, waiting for the next one"),
                }
            }
        }
        .instrument(span),
    );

    SnapshotFlusher { tx, task, store }
}

impl SnapshotFlusher {
    /// Replaces the pending snapshot.
    pub fn publish(&self, game: &Match) {
        self.tx.send_replace(game.clone());
    }

    /// Stops the flusher and writes the final snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the final write fails.
    #[instrument(skip(self))]
    pub async fn close(self) -> Result<(), StoreError> {
        let last = self.tx.borrow().clone();
        drop(self.tx);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Flusher task ended abnormally");
        }
        self.store.save(&last).await
    }
}
