//! Host application access
//!
//! The watch loop reloads the host application before every classification so
//! newly added entities and generators are visible. [`RegistryFileHost`] does
//! this by optionally running a dump command and re-reading the JSON registry
//! it writes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use stubwatch_core::{Error, HostConfig, Result};
use stubwatch_planner::{EntitySource, GeneratorSource, RegistrySnapshot};
use tokio::process::Command;
use tracing::{debug, info};

/// A loaded host application exposing its entity and generator registries
#[async_trait]
pub trait HostApplication: Send + Sync {
    /// Refresh the application state so the next classification sees current
    /// definitions
    async fn reload(&mut self) -> Result<()>;

    fn entities(&self) -> &dyn EntitySource;

    fn generators(&self) -> &dyn GeneratorSource;
}

/// Host backed by a registry snapshot file
pub struct RegistryFileHost {
    root: PathBuf,
    registry_path: PathBuf,
    reload_command: Vec<String>,
    snapshot: RegistrySnapshot,
}

impl RegistryFileHost {
    /// `registry_path` is resolved against `root` when relative
    pub fn new(root: impl Into<PathBuf>, config: &HostConfig) -> Self {
        let root = root.into();
        let registry_path = root.join(&config.registry_path);
        Self {
            root,
            registry_path,
            reload_command: config.reload_command.clone(),
            snapshot: RegistrySnapshot::new(),
        }
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn snapshot(&self) -> &RegistrySnapshot {
        &self.snapshot
    }

    async fn run_reload_command(&self) -> Result<()> {
        let Some((program, args)) = self.reload_command.split_first() else {
            return Ok(());
        };

        debug!("Running reload command: {}", self.reload_command.join(" "));
        let status = Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .status()
            .await
            .map_err(|e| Error::reload(format!("Failed to spawn {program}: {e}")))?;

        if !status.success() {
            return Err(Error::reload(format!(
                "`{}` exited with {status}",
                self.reload_command.join(" ")
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl HostApplication for RegistryFileHost {
    async fn reload(&mut self) -> Result<()> {
        self.run_reload_command().await?;

        let path = self.registry_path.display().to_string();
        let content = tokio::fs::read_to_string(&self.registry_path)
            .await
            .map_err(|e| Error::registry(path.clone(), e.to_string()))?;
        self.snapshot = RegistrySnapshot::from_json_str(&content)
            .map_err(|e| Error::registry(path, e.to_string()))?;

        info!("Reloaded host registry from {}", self.registry_path.display());
        Ok(())
    }

    fn entities(&self) -> &dyn EntitySource {
        &self.snapshot
    }

    fn generators(&self) -> &dyn GeneratorSource {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stubwatch_core::Generator;
    use tempfile::TempDir;

    const REGISTRY: &str = r#"{
        "constants": ["User"],
        "definitions": { "User": { "categories": ["persistence_model"] } },
        "generators": ["Tapioca::Dsl::Compilers::ActiveRecordColumns"]
    }"#;

    fn host_config(reload_command: Vec<String>) -> HostConfig {
        HostConfig {
            registry_path: "registry.json".to_string(),
            reload_command,
        }
    }

    #[tokio::test]
    async fn test_reload_reads_registry() {
        let dir = TempDir::new().expect("test setup failed");
        std::fs::write(dir.path().join("registry.json"), REGISTRY).expect("test setup failed");

        let mut host = RegistryFileHost::new(dir.path(), &host_config(vec![]));
        assert!(host.entities().candidate_names().is_empty());

        host.reload().await.expect("reload succeeds");
        assert_eq!(host.entities().candidate_names(), vec!["User"]);
        assert_eq!(
            host.generators().generators(),
            vec![Generator::new("Tapioca::Dsl::Compilers::ActiveRecordColumns")]
        );
    }

    #[tokio::test]
    async fn test_reload_missing_registry_fails() {
        let dir = TempDir::new().expect("test setup failed");
        let mut host = RegistryFileHost::new(dir.path(), &host_config(vec![]));

        let err = host.reload().await.unwrap_err();
        assert!(matches!(err, Error::Registry { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reload_command_writes_registry() {
        let dir = TempDir::new().expect("test setup failed");
        std::fs::write(dir.path().join("source.json"), REGISTRY).expect("test setup failed");

        let command = vec![
            "cp".to_string(),
            "source.json".to_string(),
            "registry.json".to_string(),
        ];
        let mut host = RegistryFileHost::new(dir.path(), &host_config(command));

        host.reload().await.expect("reload succeeds");
        assert_eq!(host.entities().candidate_names(), vec!["User"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_reload_command() {
        let dir = TempDir::new().expect("test setup failed");
        let mut host = RegistryFileHost::new(dir.path(), &host_config(vec!["false".to_string()]));

        let err = host.reload().await.unwrap_err();
        assert!(matches!(err, Error::Reload(_)));
    }
}
