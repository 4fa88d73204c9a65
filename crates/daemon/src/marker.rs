//! `.gitattributes` marker for generated interface files

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Attribute lines marking every interface file in the output directory as
/// generated and vendored
pub const GITATTRIBUTES_CONTENT: &str =
    "**/*.rbi linguist-generated=true\n**/*.rbi linguist-vendored=true\n";

/// Writes the `.gitattributes` marker into `dir` when dropped
///
/// Hold one for the duration of a generation run; the marker is written on
/// every exit path, including early `?` returns and panics.
#[must_use = "the marker is written when the guard is dropped"]
pub struct GeneratedMarker {
    dir: PathBuf,
}

impl GeneratedMarker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(".gitattributes")
    }

    fn write(dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(".gitattributes"), GITATTRIBUTES_CONTENT)
    }
}

impl Drop for GeneratedMarker {
    fn drop(&mut self) {
        match Self::write(&self.dir) {
            Ok(()) => debug!("Wrote generated-files marker in {}", self.dir.display()),
            Err(e) => warn!(
                "Failed to write .gitattributes in {}: {}",
                self.dir.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_marker_written_on_drop() {
        let dir = TempDir::new().expect("test setup failed");
        let outdir = dir.path().join("sorbet/rbi/dsl");

        let marker = GeneratedMarker::new(&outdir);
        let path = marker.path();
        assert!(!path.exists());
        drop(marker);

        let content = std::fs::read_to_string(path).expect("marker exists");
        assert_eq!(content, GITATTRIBUTES_CONTENT);
    }

    #[test]
    fn test_marker_written_on_early_return() {
        fn generate() -> Result<(), String> {
            Err("generation failed".to_string())
        }

        fn failing_run(outdir: &Path) -> Result<(), String> {
            let _marker = GeneratedMarker::new(outdir);
            generate()?;
            Ok(())
        }

        let dir = TempDir::new().expect("test setup failed");
        assert!(failing_run(dir.path()).is_err());
        assert!(dir.path().join(".gitattributes").exists());
    }

    #[test]
    fn test_marker_written_on_panic() {
        let dir = TempDir::new().expect("test setup failed");
        let outdir = dir.path().to_path_buf();

        let result = std::panic::catch_unwind(move || {
            let _marker = GeneratedMarker::new(outdir);
            panic!("generator crashed");
        });

        assert!(result.is_err());
        assert!(dir.path().join(".gitattributes").exists());
    }

    #[test]
    fn test_unwritable_directory_does_not_panic() {
        let dir = TempDir::new().expect("test setup failed");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").expect("test setup failed");

        // A regular file where the directory should be
        drop(GeneratedMarker::new(blocker.join("dsl")));
    }
}
