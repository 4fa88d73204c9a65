//! File change event types and per-path coalescing
//!
//! Raw notifications are reduced to [`FileChange`] values. Within one
//! quiescence window the changes to a single path are folded into one
//! [`ChangeKind`] so the emitted batch lists each path at most once.

use std::path::{Path, PathBuf};

/// Represents a file system change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was created
    Created(PathBuf),
    /// File contents or metadata changed
    Modified(PathBuf),
    /// File was deleted
    Deleted(PathBuf),
    /// File was renamed
    Renamed { from: PathBuf, to: PathBuf },
}

impl FileChange {
    /// Get the primary path associated with this change
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Modified(path) | Self::Deleted(path) => path,
            Self::Renamed { to, .. } => to,
        }
    }

    /// Split into per-path kinds; a rename removes `from` and adds `to`
    pub fn into_kinds(self) -> Vec<(PathBuf, ChangeKind)> {
        match self {
            Self::Created(path) => vec![(path, ChangeKind::Created)],
            Self::Modified(path) => vec![(path, ChangeKind::Modified)],
            Self::Deleted(path) => vec![(path, ChangeKind::Deleted)],
            Self::Renamed { from, to } => {
                vec![(from, ChangeKind::Deleted), (to, ChangeKind::Created)]
            }
        }
    }
}

/// Net effect of the changes seen for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

impl ChangeKind {
    /// Fold a later change into this one
    ///
    /// Returns `None` when the two cancel out (created, then deleted).
    pub fn merge(self, next: ChangeKind) -> Option<ChangeKind> {
        use ChangeKind::*;

        match (self, next) {
            (Created, Deleted) => None,
            (Created, _) => Some(Created),
            (Modified, Deleted) => Some(Deleted),
            (Modified, _) => Some(Modified),
            (Deleted, Deleted) => Some(Deleted),
            (Deleted, _) => Some(Modified),
        }
    }
}
