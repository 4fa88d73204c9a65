//! Core file system watcher implementation
//!
//! This module wires the notify crate to the debouncer: raw notifications are
//! made root-relative, filtered against the ignore patterns and handed to the
//! [`EventDebouncer`], which emits one [`ChangeBatch`] per quiet period.

use crate::{
    config::WatcherConfig, debouncer::EventDebouncer, events::FileChange, ignore::IgnoreFilter,
};
use notify::event::{ModifyKind, RenameMode};
use notify::{
    Config as NotifyConfig, Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode,
    Watcher as NotifyWatcher,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stubwatch_core::error::{Error, Result};
use stubwatch_core::ChangeBatch;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Main file system watcher
pub struct FileWatcher {
    config: Arc<WatcherConfig>,
    ignore_filter: Arc<IgnoreFilter>,
    /// Active notify watcher; dropping it stops notifications
    watcher: Option<RecommendedWatcher>,
    /// Root being watched
    root: Option<PathBuf>,
    /// Cancellation token for stopping background tasks
    cancellation_token: CancellationToken,
}

impl FileWatcher {
    /// Create a new file watcher
    pub fn new(config: WatcherConfig) -> Result<Self> {
        let ignore_filter = IgnoreFilter::from_patterns(&config.ignore_patterns)
            .map_err(|e| Error::watcher(format!("Failed to create ignore filter: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            ignore_filter: Arc::new(ignore_filter),
            watcher: None,
            root: None,
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Start watching `root` recursively
    ///
    /// Paths in the emitted batches are relative to `root`.
    pub async fn watch(&mut self, root: impl AsRef<Path>) -> Result<mpsc::Receiver<ChangeBatch>> {
        if self.watcher.is_some() {
            return Err(Error::watcher("Watcher is already running"));
        }

        // Notify reports canonical paths on some platforms (macOS /private/var)
        let root = tokio::fs::canonicalize(root.as_ref())
            .await
            .map_err(|e| Error::watcher(format!("Cannot watch {:?}: {e}", root.as_ref())))?;

        let (notify_tx, notify_rx) = mpsc::channel(self.config.max_queue_size);
        let (batch_tx, batch_rx) = mpsc::channel(self.config.max_queue_size);

        let debouncer = EventDebouncer::new(self.config.debounce_duration(), batch_tx);
        self.start_event_processor(notify_rx, debouncer, root.clone());

        let mut watcher = self.init_watcher_with_retry(notify_tx).await?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| Error::watcher(format!("Failed to watch path {root:?}: {e}")))?;
        info!("Watching path: {:?}", root);

        self.watcher = Some(watcher);
        self.root = Some(root);

        Ok(batch_rx)
    }

    /// Initialize notify watcher with retry logic
    async fn init_watcher_with_retry(
        &self,
        tx: mpsc::Sender<NotifyEvent>,
    ) -> Result<RecommendedWatcher> {
        let mut attempts = 0;
        let max_attempts = self.config.max_init_retries.max(1);

        loop {
            attempts += 1;

            match self.create_notify_watcher(tx.clone()) {
                Ok(watcher) => {
                    debug!("File watcher initialized");
                    return Ok(watcher);
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Failed to initialize watcher (attempt {}/{}): {}",
                        attempts, max_attempts, e
                    );
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                Err(e) => {
                    error!("Failed to initialize watcher after {} attempts", attempts);
                    return Err(Error::watcher(format!(
                        "Watcher initialization failed: {e}"
                    )));
                }
            }
        }
    }

    fn create_notify_watcher(&self, tx: mpsc::Sender<NotifyEvent>) -> Result<RecommendedWatcher> {
        let config = NotifyConfig::default()
            .with_poll_interval(self.config.polling_interval())
            .with_compare_contents(false);

        RecommendedWatcher::new(
            move |res: std::result::Result<NotifyEvent, notify::Error>| match res {
                Ok(event) => {
                    if let Err(e) = tx.try_send(event) {
                        error!("Failed to queue notify event: {}", e);
                    }
                }
                Err(e) => {
                    error!("Notify error: {}", e);
                }
            },
            config,
        )
        .map_err(|e| Error::watcher(format!("Failed to create watcher: {e}")))
    }

    fn start_event_processor(
        &self,
        mut notify_rx: mpsc::Receiver<NotifyEvent>,
        debouncer: EventDebouncer,
        root: PathBuf,
    ) {
        let ignore_filter = Arc::clone(&self.ignore_filter);
        let cancel_token = self.cancellation_token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        debouncer.flush().await;
                        break;
                    }
                    event = notify_rx.recv() => {
                        let Some(event) = event else { break };
                        trace!("Received notify event: {:?}", event);

                        for change in convert_notify_event(&event, &root, &ignore_filter) {
                            debouncer.process_event(change);
                        }
                    }
                }
            }
            debug!("Event processor stopped");
        });
    }

    /// Stop watching; pending changes are flushed as a final batch
    pub async fn stop(&mut self) -> Result<()> {
        self.cancellation_token.cancel();
        self.cancellation_token = CancellationToken::new();
        if self.watcher.take().is_some() {
            self.root = None;
            info!("File watcher stopped");
        }
        Ok(())
    }

    /// The watched root, once [`FileWatcher::watch`] succeeded
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}

/// Convert a notify event to root-relative file changes
fn convert_notify_event(
    event: &NotifyEvent,
    root: &Path,
    ignore_filter: &IgnoreFilter,
) -> Vec<FileChange> {
    let relative = |path: &PathBuf| -> Option<PathBuf> {
        let relative = path.strip_prefix(root).ok()?.to_path_buf();
        if relative.as_os_str().is_empty() || ignore_filter.should_ignore(&relative) {
            trace!("Ignoring path: {:?}", path);
            return None;
        }
        Some(relative)
    };

    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            match (relative(&event.paths[0]), relative(&event.paths[1])) {
                (Some(from), Some(to)) => vec![FileChange::Renamed { from, to }],
                (Some(from), None) => vec![FileChange::Deleted(from)],
                (None, Some(to)) => vec![FileChange::Created(to)],
                (None, None) => Vec::new(),
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => event
            .paths
            .iter()
            .filter_map(relative)
            .map(FileChange::Deleted)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) | EventKind::Create(_) => event
            .paths
            .iter()
            .filter(|path| !path.is_dir())
            .filter_map(relative)
            .map(FileChange::Created)
            .collect(),
        EventKind::Modify(_) => event
            .paths
            .iter()
            .filter(|path| !path.is_dir())
            .filter_map(relative)
            .map(FileChange::Modified)
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .iter()
            .filter_map(relative)
            .map(FileChange::Deleted)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, RemoveKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: &[&str]) -> NotifyEvent {
        let mut event = NotifyEvent::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    fn filter() -> IgnoreFilter {
        IgnoreFilter::from_patterns(&["*.swp".to_string()]).expect("test setup failed")
    }

    #[test]
    fn test_convert_makes_paths_relative() {
        let changes = convert_notify_event(
            &event(
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                &["/project/app/models/user.rb"],
            ),
            Path::new("/project"),
            &filter(),
        );
        assert_eq!(
            changes,
            vec![FileChange::Modified(PathBuf::from("app/models/user.rb"))]
        );
    }

    #[test]
    fn test_convert_rename_both() {
        let changes = convert_notify_event(
            &event(
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                &["/project/app/a.rb", "/project/app/b.rb"],
            ),
            Path::new("/project"),
            &filter(),
        );
        assert_eq!(
            changes,
            vec![FileChange::Renamed {
                from: PathBuf::from("app/a.rb"),
                to: PathBuf::from("app/b.rb"),
            }]
        );
    }

    #[test]
    fn test_convert_skips_ignored_and_foreign_paths() {
        let root = Path::new("/project");
        let ignored = convert_notify_event(
            &event(EventKind::Create(CreateKind::File), &["/project/app/.a.rb.swp"]),
            root,
            &filter(),
        );
        assert!(ignored.is_empty());

        let foreign = convert_notify_event(
            &event(EventKind::Remove(RemoveKind::File), &["/elsewhere/a.rb"]),
            root,
            &filter(),
        );
        assert!(foreign.is_empty());
    }

    #[test]
    fn test_convert_ignores_access_events() {
        let changes = convert_notify_event(
            &event(EventKind::Access(notify::event::AccessKind::Any), &["/project/a.rb"]),
            Path::new("/project"),
            &filter(),
        );
        assert!(changes.is_empty());
    }

    #[tokio::test]
    async fn test_watch_and_stop() {
        let temp_dir = TempDir::new().expect("test setup failed");
        let mut watcher = FileWatcher::new(WatcherConfig::default()).expect("test setup failed");
        assert!(!watcher.is_watching());

        let _rx = watcher.watch(temp_dir.path()).await.expect("watch starts");
        assert!(watcher.is_watching());
        assert!(watcher.root().is_some());
        assert!(watcher.watch(temp_dir.path()).await.is_err());

        watcher.stop().await.expect("stop succeeds");
        assert!(!watcher.is_watching());
    }

    #[tokio::test]
    async fn test_watch_missing_root_fails() {
        let mut watcher = FileWatcher::new(WatcherConfig::default()).expect("test setup failed");
        assert!(watcher.watch("/nonexistent/stubwatch/root").await.is_err());
    }
}
