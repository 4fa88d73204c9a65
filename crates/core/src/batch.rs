//! Change batches delivered by the file watcher
//!
//! A batch groups every path touched during one quiescence period. The three
//! lists keep the order the notifier produced and are not deduplicated.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One detected change event: the paths modified, added and removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    /// Paths whose contents changed
    #[serde(default)]
    pub modified: Vec<PathBuf>,
    /// Paths that appeared
    #[serde(default)]
    pub added: Vec<PathBuf>,
    /// Paths that disappeared
    #[serde(default)]
    pub removed: Vec<PathBuf>,
}

impl ChangeBatch {
    /// Create a batch from the three path lists
    pub fn new(modified: Vec<PathBuf>, added: Vec<PathBuf>, removed: Vec<PathBuf>) -> Self {
        Self {
            modified,
            added,
            removed,
        }
    }

    /// Batch containing only modified paths
    pub fn modified<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            modified: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Iterate `modified`, then `added`, then `removed`, keeping duplicates
    pub fn all_paths(&self) -> impl Iterator<Item = &Path> {
        self.modified
            .iter()
            .chain(self.added.iter())
            .chain(self.removed.iter())
            .map(PathBuf::as_path)
    }

    /// Owned union of all three lists in order
    pub fn union(&self) -> Vec<PathBuf> {
        self.all_paths().map(Path::to_path_buf).collect()
    }

    /// Total number of paths across the three lists
    pub fn len(&self) -> usize {
        self.modified.len() + self.added.len() + self.removed.len()
    }

    /// True when no path changed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_union_preserves_order_and_duplicates() {
        let batch = ChangeBatch::new(
            vec![PathBuf::from("b.rb"), PathBuf::from("a.rb")],
            vec![PathBuf::from("a.rb")],
            vec![PathBuf::from("c.rb")],
        );

        assert_eq!(
            batch.union(),
            vec![
                PathBuf::from("b.rb"),
                PathBuf::from("a.rb"),
                PathBuf::from("a.rb"),
                PathBuf::from("c.rb"),
            ]
        );
        assert_eq!(batch.len(), 4);
    }

    #[test]
    fn test_empty_batch() {
        let batch = ChangeBatch::default();
        assert!(batch.is_empty());
        assert_eq!(batch.all_paths().count(), 0);
    }
}
