#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! Watch daemon: regenerates interface files as the application changes
//!
//! Wires the file watcher to the change classifier. Each batch from the
//! watcher is filtered, the host application is reloaded, the batch is
//! classified and the resulting plan is handed to the generation runner.

mod host;
mod marker;
mod runner;
mod watch_loop;

pub use host::{HostApplication, RegistryFileHost};
pub use marker::{GeneratedMarker, GITATTRIBUTES_CONTENT};
pub use runner::{CommandRunner, GenerationRunner};
pub use watch_loop::{RunOutcome, RunStatus, WatchLoop, WatchLoopHandle, WatchStats};

use std::path::PathBuf;
use stubwatch_core::{Config, Result};
use stubwatch_watcher::{FileWatcher, WatcherConfig};
use tracing::info;

/// Start watching `root` and regenerating on change
///
/// The watcher, host and runner are built from `config`. The returned handle
/// stops the watcher when shut down or dropped; changes still pending in the
/// debouncer are processed before the loop exits.
pub async fn start_watch_loop(root: impl Into<PathBuf>, config: &Config) -> Result<WatchLoopHandle> {
    let root = root.into();

    let mut file_watcher = FileWatcher::new(WatcherConfig::from(&config.watcher))?;
    let batches = file_watcher.watch(&root).await?;

    let host = RegistryFileHost::new(&root, &config.host);
    let runner = CommandRunner::new(&root, &config.generator);
    let watch_loop = WatchLoop::new(config.planner.clone(), Box::new(host), Box::new(runner))
        .exit_on_failure(config.daemon.exit_on_failure);

    info!("Watching {} for changes", root.display());

    Ok(WatchLoopHandle::spawn_watching(watch_loop, file_watcher, batches))
}
