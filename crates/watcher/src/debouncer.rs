//! Quiescence debouncing of file system events into change batches
//!
//! Every incoming change restarts the quiet-period timer. Once no change has
//! arrived for the whole debounce window, the pending changes are drained into
//! a single [`ChangeBatch`]. Changes to the same path inside one window are
//! coalesced with [`ChangeKind::merge`].

use crate::events::{ChangeKind, FileChange};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stubwatch_core::ChangeBatch;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, trace};

/// Pending change for one path
#[derive(Debug, Clone, Copy)]
struct PendingChange {
    kind: ChangeKind,
    /// Arrival order of the first change, used to keep batch order stable
    first_seen: u64,
}

/// Collects file changes and emits a batch after a quiet period
pub struct EventDebouncer {
    /// Debounce window duration
    debounce_duration: Duration,
    /// Map of paths to pending changes
    pending_events: Arc<DashMap<PathBuf, PendingChange>>,
    /// Bumped on every event; a timer only flushes if it saw the latest value
    generation: Arc<AtomicU64>,
    /// Channel to send batches
    output_tx: mpsc::Sender<ChangeBatch>,
}

impl EventDebouncer {
    pub fn new(debounce_duration: Duration, output_tx: mpsc::Sender<ChangeBatch>) -> Self {
        Self {
            debounce_duration,
            pending_events: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
            output_tx,
        }
    }

    /// Process an incoming event and restart the quiet-period timer
    pub fn process_event(&self, event: FileChange) {
        let seen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        for (path, kind) in event.into_kinds() {
            self.record(path, kind, seen);
        }

        let pending_events = Arc::clone(&self.pending_events);
        let generation = Arc::clone(&self.generation);
        let output_tx = self.output_tx.clone();
        let debounce_duration = self.debounce_duration;

        tokio::spawn(async move {
            sleep(debounce_duration).await;

            if generation.load(Ordering::SeqCst) != seen {
                trace!("Newer change arrived, postponing flush");
                return;
            }

            if let Some(batch) = drain(&pending_events) {
                debug!("Emitting change batch of {} paths", batch.len());
                let _ = output_tx.send(batch).await;
            }
        });
    }

    fn record(&self, path: PathBuf, kind: ChangeKind, seen: u64) {
        // The entry guard holds the shard lock, so a concurrent drain cannot
        // interleave with the merge.
        match self.pending_events.entry(path) {
            Entry::Occupied(mut entry) => {
                let merged = entry.get().kind.merge(kind);
                match merged {
                    Some(merged) => {
                        trace!("Pending {:?} for {:?}", merged, entry.key());
                        entry.get_mut().kind = merged;
                    }
                    None => {
                        trace!("Changes to {:?} cancelled out", entry.key());
                        entry.remove();
                    }
                }
            }
            Entry::Vacant(entry) => {
                trace!("Pending {:?} for {:?}", kind, entry.key());
                entry.insert(PendingChange {
                    kind,
                    first_seen: seen,
                });
            }
        }
    }

    /// Force flush all pending changes, regardless of the quiet period
    pub async fn flush(&self) {
        debug!("Flushing {} pending changes", self.pending_events.len());
        if let Some(batch) = drain(&self.pending_events) {
            let _ = self.output_tx.send(batch).await;
        }
    }

    /// Get the number of paths with pending changes
    pub fn pending_count(&self) -> usize {
        self.pending_events.len()
    }
}

/// Remove every pending change and build a batch in first-seen order
fn drain(pending_events: &DashMap<PathBuf, PendingChange>) -> Option<ChangeBatch> {
    let keys: Vec<PathBuf> = pending_events
        .iter()
        .map(|entry| entry.key().clone())
        .collect();

    let mut changes: Vec<(PathBuf, PendingChange)> = keys
        .iter()
        .filter_map(|key| pending_events.remove(key))
        .collect();
    if changes.is_empty() {
        return None;
    }
    changes.sort_by_key(|(_, change)| change.first_seen);

    let mut batch = ChangeBatch::default();
    for (path, change) in changes {
        match change.kind {
            ChangeKind::Created => batch.added.push(path),
            ChangeKind::Modified => batch.modified.push(path),
            ChangeKind::Deleted => batch.removed.push(path),
        }
    }
    Some(batch)
}
