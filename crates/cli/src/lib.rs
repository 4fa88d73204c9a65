//! Library interface for the stubwatch CLI
//!
//! This module exposes the command implementations for integration testing
//! while keeping argument parsing in main.rs.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use stubwatch_core::{ChangeBatch, GenerationPlan};
use stubwatch_daemon::{HostApplication, RegistryFileHost};
use stubwatch_planner::{ChangeClassifier, PathFilter};
use tracing::debug;

// Re-export commonly needed types for tests
pub use stubwatch_core::config::Config;

/// Result of the one-shot `plan` command
#[derive(Debug, Serialize)]
pub struct PlanReport {
    /// Whether the batch would trigger a generation pass
    pub relevant: bool,
    /// Paths that passed the relevance filter
    pub relevant_paths: Vec<PathBuf>,
    /// The classified plan; absent for irrelevant batches
    pub plan: Option<GenerationPlan>,
    /// Human-readable plan description
    pub summary: Vec<String>,
}

/// Classify `batch` against the host application rooted at `root`
///
/// The host is only reloaded for relevant batches, as in the watch loop.
pub async fn plan_batch(root: &Path, config: &Config, batch: &ChangeBatch) -> Result<PlanReport> {
    let filter = PathFilter::from_config(&config.planner);
    let relevant_paths: Vec<PathBuf> = filter
        .relevant_paths(batch)
        .into_iter()
        .map(Path::to_path_buf)
        .collect();

    if relevant_paths.is_empty() {
        debug!("No relevant paths in batch of {}", batch.len());
        return Ok(PlanReport {
            relevant: false,
            relevant_paths,
            plan: None,
            summary: Vec::new(),
        });
    }

    let mut host = RegistryFileHost::new(root, &config.host);
    host.reload()
        .await
        .context("Failed to reload host application")?;

    let plan = ChangeClassifier::new(&config.planner, host.entities(), host.generators())
        .classify(batch);

    Ok(PlanReport {
        relevant: true,
        relevant_paths,
        summary: plan.summary(),
        plan: Some(plan),
    })
}
