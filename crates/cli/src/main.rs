//! stubwatch CLI - regenerate interface files as the application changes
//!
//! This binary provides the command-line interface for the stubwatch daemon.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stubwatch::{plan_batch, Config};
use stubwatch_core::ChangeBatch;
use tracing::info;

#[derive(Parser)]
#[command(name = "stubwatch")]
#[command(about = "Watch an application and regenerate its interface files on change")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the application and regenerate on every relevant change
    Watch {
        /// Application root
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Classify a change set once and print the plan as JSON
    Plan {
        /// Modified paths
        #[arg(long, value_name = "PATH")]
        modified: Vec<PathBuf>,
        /// Added paths
        #[arg(long, value_name = "PATH")]
        added: Vec<PathBuf>,
        /// Removed paths
        #[arg(long, value_name = "PATH")]
        removed: Vec<PathBuf>,
        /// Application root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    match cli.command {
        Some(Commands::Watch { root }) => watch(&root, cli.config.as_deref()).await,
        Some(Commands::Plan {
            modified,
            added,
            removed,
            root,
        }) => {
            let batch = ChangeBatch::new(modified, added, removed);
            plan(&root, cli.config.as_deref(), &batch).await
        }
        None => {
            println!("Run 'stubwatch watch' to start watching, or --help for more options");
            Ok(())
        }
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "stubwatch={level},stubwatch_core={level},stubwatch_planner={level},\
                     stubwatch_watcher={level},stubwatch_daemon={level}"
                ))
            }),
        )
        .init();

    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run the watch loop until Ctrl-C or a fatal failure
async fn watch(root: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let handle = stubwatch_daemon::start_watch_loop(root, &config).await?;

    let shutdown = handle.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            shutdown.cancel();
        }
    });

    let stats = handle.join().await?;
    info!(
        "Processed {} batches: {} generated, {} failed",
        stats.batches_seen, stats.runs_generated, stats.runs_failed
    );
    Ok(())
}

/// Print the plan for one change set
async fn plan(root: &Path, config_path: Option<&Path>, batch: &ChangeBatch) -> Result<()> {
    let config = load_config(config_path)?;
    let report = plan_batch(root, &config, batch).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
