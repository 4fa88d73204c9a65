//! Cheap relevance pre-filter for change batches

use std::path::Path;
use stubwatch_core::{ChangeBatch, PlannerConfig};
use tracing::trace;

/// Decides whether a batch touches any tracked source file
///
/// A path is ignored when its string form contains the tooling marker or does
/// not end with the tracked extension.
#[derive(Debug, Clone)]
pub struct PathFilter {
    tracked_extension: String,
    ignored_marker: String,
}

impl PathFilter {
    pub fn new(tracked_extension: impl Into<String>, ignored_marker: impl Into<String>) -> Self {
        Self {
            tracked_extension: tracked_extension.into(),
            ignored_marker: ignored_marker.into(),
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(&config.tracked_extension, &config.ignored_marker)
    }

    /// Check if a single path is ignored
    pub fn is_ignored(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        let ignored = path_str.contains(self.ignored_marker.as_str())
            || !path_str.ends_with(self.tracked_extension.as_str());
        if ignored {
            trace!("Ignoring path: {:?}", path);
        }
        ignored
    }

    /// True iff at least one path of the batch survives filtering
    pub fn is_relevant(&self, batch: &ChangeBatch) -> bool {
        batch.all_paths().any(|path| !self.is_ignored(path))
    }

    /// The paths that survive filtering, in batch order
    pub fn relevant_paths<'a>(&self, batch: &'a ChangeBatch) -> Vec<&'a Path> {
        batch
            .all_paths()
            .filter(|path| !self.is_ignored(path))
            .collect()
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}
