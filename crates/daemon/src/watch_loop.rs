//! The watch loop: change batch in, generator run out
//!
//! Batches are handled strictly one at a time in arrival order:
//!
//! 1. Skip the batch unless at least one path passes the [`PathFilter`]
//! 2. Reload the host application
//! 3. Classify the batch into a [`GenerationPlan`]
//! 4. Run the generator when the plan is actionable
//!
//! A failed reload or run is logged and the loop keeps watching, unless
//! `exit_on_failure` is set.

use crate::host::HostApplication;
use crate::runner::GenerationRunner;
use std::time::{Duration, Instant};
use stubwatch_core::{ChangeBatch, Error, GenerationPlan, PlannerConfig, Result, ResultExt};
use stubwatch_planner::{ChangeClassifier, PathFilter};
use stubwatch_watcher::FileWatcher;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What happened to one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// No relevant path in the batch
    Skipped,
    /// Relevant, but the plan had no scope or no generators
    NotActionable,
    /// The generator ran successfully
    Generated,
    /// Reload or generation failed
    Failed,
}

/// Record of one processed batch
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The classified plan; absent when skipped or when reload failed
    pub plan: Option<GenerationPlan>,
    pub status: RunStatus,
    pub duration: Duration,
}

impl RunOutcome {
    fn new(plan: Option<GenerationPlan>, status: RunStatus, started: Instant) -> Self {
        Self {
            plan,
            status,
            duration: started.elapsed(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status != RunStatus::Failed
    }
}

/// Counters over the lifetime of a loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    pub batches_seen: usize,
    /// Irrelevant batches and relevant ones with nothing to generate
    pub batches_skipped: usize,
    pub runs_generated: usize,
    pub runs_failed: usize,
}

impl WatchStats {
    fn record(&mut self, status: RunStatus) {
        self.batches_seen += 1;
        match status {
            RunStatus::Skipped | RunStatus::NotActionable => self.batches_skipped += 1,
            RunStatus::Generated => self.runs_generated += 1,
            RunStatus::Failed => self.runs_failed += 1,
        }
    }
}

/// Sequential batch processor
pub struct WatchLoop {
    planner: PlannerConfig,
    filter: PathFilter,
    host: Box<dyn HostApplication>,
    runner: Box<dyn GenerationRunner>,
    exit_on_failure: bool,
    stats: WatchStats,
}

impl WatchLoop {
    pub fn new(
        planner: PlannerConfig,
        host: Box<dyn HostApplication>,
        runner: Box<dyn GenerationRunner>,
    ) -> Self {
        Self {
            filter: PathFilter::from_config(&planner),
            planner,
            host,
            runner,
            exit_on_failure: false,
            stats: WatchStats::default(),
        }
    }

    /// Return the first reload or generation error instead of logging it
    pub fn exit_on_failure(mut self, exit: bool) -> Self {
        self.exit_on_failure = exit;
        self
    }

    pub fn stats(&self) -> WatchStats {
        self.stats
    }

    /// Process one batch
    ///
    /// Only returns `Err` when `exit_on_failure` is set and the reload or the
    /// generation run failed.
    pub async fn process_batch(&mut self, batch: &ChangeBatch) -> Result<RunOutcome> {
        let started = Instant::now();

        if !self.filter.is_relevant(batch) {
            debug!("Skipping batch of {} irrelevant paths", batch.len());
            return Ok(self.finish(RunOutcome::new(None, RunStatus::Skipped, started)));
        }

        if let Err(e) = self.host.reload().await {
            error!("Failed to reload host application: {e}");
            return self.fail(None, e, started);
        }

        let plan = {
            let classifier =
                ChangeClassifier::new(&self.planner, self.host.entities(), self.host.generators());
            classifier.classify(batch)
        };

        for line in plan.summary() {
            info!("{line}");
        }

        if !plan.is_actionable() {
            warn!(
                "Change to {} paths produced nothing to generate",
                batch.len()
            );
            return Ok(self.finish(RunOutcome::new(
                Some(plan),
                RunStatus::NotActionable,
                started,
            )));
        }

        match self.runner.run(&plan).await {
            Ok(()) => {
                let outcome = RunOutcome::new(Some(plan), RunStatus::Generated, started);
                info!("Generation finished in {:?}", outcome.duration);
                Ok(self.finish(outcome))
            }
            Err(e) => {
                error!("Generation failed: {e}");
                self.fail(Some(plan), e, started)
            }
        }
    }

    fn finish(&mut self, outcome: RunOutcome) -> RunOutcome {
        self.stats.record(outcome.status);
        outcome
    }

    fn fail(
        &mut self,
        plan: Option<GenerationPlan>,
        error: Error,
        started: Instant,
    ) -> Result<RunOutcome> {
        let outcome = self.finish(RunOutcome::new(plan, RunStatus::Failed, started));
        if self.exit_on_failure {
            return Err(error);
        }
        Ok(outcome)
    }

    /// Consume batches until the channel closes or `shutdown` is cancelled
    pub async fn run(
        mut self,
        mut batches: Receiver<ChangeBatch>,
        shutdown: CancellationToken,
    ) -> Result<WatchStats> {
        info!("Watch loop started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Watch loop received shutdown signal");
                    break;
                }
                batch = batches.recv() => {
                    let Some(batch) = batch else {
                        info!("Change channel closed, stopping watch loop");
                        break;
                    };
                    self.process_batch(&batch).await?;
                }
            }
        }

        let stats = self.stats;
        info!(
            "Watch loop stopped: {} batches, {} skipped, {} generated, {} failed",
            stats.batches_seen, stats.batches_skipped, stats.runs_generated, stats.runs_failed
        );
        Ok(stats)
    }
}

/// Handle for a watch loop running in the background
///
/// Dropping this handle will signal the background task to shut down.
pub struct WatchLoopHandle {
    shutdown: CancellationToken,
    task_handle: Option<JoinHandle<Result<WatchStats>>>,
}

impl WatchLoopHandle {
    pub(crate) fn new(
        shutdown: CancellationToken,
        task_handle: JoinHandle<Result<WatchStats>>,
    ) -> Self {
        Self {
            shutdown,
            task_handle: Some(task_handle),
        }
    }

    /// Spawn `watch_loop` over `batches`
    pub fn spawn(watch_loop: WatchLoop, batches: Receiver<ChangeBatch>) -> Self {
        let shutdown = CancellationToken::new();
        let task_handle = tokio::spawn(watch_loop.run(batches, shutdown.clone()));
        Self::new(shutdown, task_handle)
    }

    /// Spawn `watch_loop` over the batches of a running `file_watcher`
    ///
    /// On shutdown the watcher is stopped first. Its final flush is still
    /// processed, and the loop ends once the batch channel closes.
    pub fn spawn_watching(
        watch_loop: WatchLoop,
        mut file_watcher: FileWatcher,
        batches: Receiver<ChangeBatch>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let stop_requested = shutdown.clone();

        let task_handle = tokio::spawn(async move {
            let loop_task = watch_loop.run(batches, CancellationToken::new());
            tokio::pin!(loop_task);

            let result = tokio::select! {
                result = &mut loop_task => Some(result),
                _ = stop_requested.cancelled() => None,
            };

            if let Err(e) = file_watcher.stop().await {
                warn!("Failed to stop file watcher: {e}");
            }

            match result {
                Some(result) => result,
                None => {
                    debug!("Draining changes pending at shutdown");
                    loop_task.await
                }
            }
        });

        Self::new(shutdown, task_handle)
    }

    /// Signal the background task to shut down
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Token that stops the loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// True once the loop has exited on its own or after shutdown
    pub fn is_finished(&self) -> bool {
        self.task_handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Wait for the loop to end without requesting shutdown
    pub async fn join(mut self) -> Result<WatchStats> {
        match self.task_handle.take() {
            Some(handle) => handle.await.context("Watch loop task panicked")?,
            None => Ok(WatchStats::default()),
        }
    }

    /// Request shutdown and wait for the loop to finish
    pub async fn wait(self) -> Result<WatchStats> {
        self.shutdown();
        self.join().await
    }
}

impl Drop for WatchLoopHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
