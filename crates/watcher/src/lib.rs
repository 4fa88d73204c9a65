#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! File system watching that produces change batches
//!
//! This crate turns raw file system notifications into [`ChangeBatch`] values:
//! - Quiescence debouncing: one batch per burst of activity
//! - Per-path coalescing of create/modify/delete sequences
//! - Glob based ignore patterns
//! - Paths reported relative to the watched root
//!
//! # Example
//!
//! ```no_run
//! use stubwatch_watcher::{FileWatcher, WatcherConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WatcherConfig::builder().debounce_ms(250).build();
//! let mut watcher = FileWatcher::new(config)?;
//!
//! let mut batches = watcher.watch("/path/to/app").await?;
//! while let Some(batch) = batches.recv().await {
//!     println!("modified: {:?}", batch.modified);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ChangeBatch`]: stubwatch_core::ChangeBatch

// Private implementation modules
mod config;
mod debouncer;
mod events;
mod ignore;
mod watcher;

// Public exports - minimal API surface
pub use config::{WatcherConfig, WatcherConfigBuilder};
pub use debouncer::EventDebouncer;
pub use events::{ChangeKind, FileChange};
pub use ignore::IgnoreFilter;
pub use watcher::FileWatcher;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::WatcherConfig;
    pub use crate::watcher::FileWatcher;
    pub use stubwatch_core::ChangeBatch;
}
