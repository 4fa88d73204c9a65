//! Generation runner: executes a [`GenerationPlan`] with the external tool

use crate::marker::GeneratedMarker;
use async_trait::async_trait;
use std::path::PathBuf;
use stubwatch_core::{Error, GenerationPlan, GeneratorConfig, PlanScope, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// Runs the interface generator for a plan
#[async_trait]
pub trait GenerationRunner: Send + Sync {
    async fn run(&self, plan: &GenerationPlan) -> Result<()>;
}

/// Spawns the configured generation command
///
/// The command line is `<command> --only=<generators> --workers=<n>
/// --outdir=<path> <entities or paths>`.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    root: PathBuf,
    command: Vec<String>,
    outpath: String,
    workers: usize,
    write_gitattributes: bool,
}

impl CommandRunner {
    pub fn new(root: impl Into<PathBuf>, config: &GeneratorConfig) -> Self {
        Self {
            root: root.into(),
            command: config.command.clone(),
            outpath: config.outpath.clone(),
            workers: config.workers,
            write_gitattributes: config.write_gitattributes,
        }
    }

    /// Output directory, resolved against the application root
    pub fn outdir(&self) -> PathBuf {
        self.root.join(&self.outpath)
    }

    /// Arguments appended to the configured command for `plan`
    ///
    /// `--only` takes one argument per generator and is followed directly by
    /// another switch so the array ends there. Positionals come last.
    pub fn build_args(&self, plan: &GenerationPlan) -> Vec<String> {
        let mut args = Vec::new();
        if !plan.selected_generators().is_empty() {
            args.push("--only".to_string());
            args.extend(
                plan.selected_generators()
                    .iter()
                    .map(|generator| generator.name().to_string()),
            );
        }
        args.push(format!("--workers={}", self.workers));
        args.push(format!("--outdir={}", self.outpath));

        match plan.scope() {
            PlanScope::Entities => args.extend(plan.requested_entities().iter().cloned()),
            PlanScope::Paths => args.extend(
                plan.requested_paths()
                    .iter()
                    .map(|path| path.display().to_string()),
            ),
            PlanScope::Empty => {}
        }
        args
    }
}

#[async_trait]
impl GenerationRunner for CommandRunner {
    async fn run(&self, plan: &GenerationPlan) -> Result<()> {
        let _marker = self
            .write_gitattributes
            .then(|| GeneratedMarker::new(self.outdir()));

        let (program, base_args) = self
            .command
            .split_first()
            .ok_or_else(|| Error::generation("Generation command is empty"))?;
        let args = self.build_args(plan);
        debug!("Running {} {}", self.command.join(" "), args.join(" "));

        let status = Command::new(program)
            .args(base_args)
            .args(&args)
            .current_dir(&self.root)
            .status()
            .await
            .map_err(|e| Error::generation(format!("Failed to spawn {program}: {e}")))?;

        if !status.success() {
            return Err(Error::generation(format!(
                "`{}` exited with {status}",
                self.command.join(" ")
            )));
        }

        info!("Generated interface files into {}", self.outpath);
        Ok(())
    }
}
