//! Runs the reconciliation stages in order.
//!
//! [`Orchestrator`] walks the [`Stage`] state machine from
//! [`Stage::FIRST`] to [`Stage::Done`] against any [`IssueTracker`]. A stage
//! error is recorded and the next stage still runs. [`Runner`] wires an
//! orchestrator to GitHub.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::config::SyncConfig;
use crate::stages::{self, Stage, StageLog};
use crate::summary::{ExecutionResult, RunReport, StageRecord};
use crate::tracker::{DryRunTracker, GitHubTracker, IssueTracker};
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// Sequences the four stages over one tracker.
pub struct Orchestrator<'a, T: ?Sized> {
    tracker: &'a T,
    config: &'a SyncConfig,
}

impl<'a, T: IssueTracker + ?Sized> Orchestrator<'a, T> {
    /// Creates an orchestrator.
    pub fn new(tracker: &'a T, config: &'a SyncConfig) -> Self {
        Self { tracker, config }
    }

    /// Runs every stage and returns their records in order.
    pub async fn run(&self) -> ExecutionResult {
        let mut result = ExecutionResult::new(self.config.dry_run);
        let mut stage = Stage::FIRST;
        while stage != Stage::Done {
            result.record(self.run_stage(stage).await);
            stage = stage.next();
        }
        result
    }

    /// Runs every stage and builds the report.
    pub async fn run_with_report(&self) -> RunReport {
        let started = Instant::now();
        let result = self.run().await;
        result.into_report(started.elapsed(), self.config.output_lines)
    }

    /// Runs one stage, capturing its output, failures and duration.
    pub async fn run_stage(&self, stage: Stage) -> StageRecord {
        let span = info_span!("stage", stage = stage.name());

        async {
            info!("Starting stage");
            let started = Instant::now();
            let mut log = StageLog::default();

            let outcome = match stage {
                Stage::IssueMigration => {
                    stages::issue_migration::run(self.tracker, self.config, &mut log).await
                }
                Stage::LabelSync => {
                    stages::label_sync::run(self.tracker, self.config, &mut log).await
                }
                Stage::ProjectLabelCreation => {
                    stages::project_labels::run(self.tracker, self.config, &mut log).await
                }
                Stage::ProjectFieldSync => {
                    stages::project_fields::run(self.tracker, self.config, &mut log).await
                }
                Stage::Done => Ok(()),
            };

            let error = match outcome {
                Ok(()) => None,
                Err(e) => {
                    error!(error = %e, "Stage failed");
                    Some(e.to_string())
                }
            };
            let record = log.into_record(stage, started.elapsed(), error);
            info!(
                success = record.success(),
                failures = record.failures.len(),
                duration_ms = record.duration.as_millis() as u64,
                "Finished stage"
            );
            record
        }
        .instrument(span)
        .await
    }
}

/// Runs the pipeline against GitHub.
pub struct Runner {
    config: RunnerConfig,
    tracker: GitHubTracker,
}

impl Runner {
    /// Validates the configuration and builds the GitHub client.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the configuration is invalid or the client
    /// cannot be built.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        config.sync().validate("configuration")?;
        let tracker = GitHubTracker::new(config.token())?;
        Ok(Self { config, tracker })
    }

    /// Executes every stage and returns the report.
    pub async fn run(&self) -> RunReport {
        let sync = self.config.sync();
        info!(
            source = %sync.source_org,
            dest = %sync.dest_org,
            repos = sync.repos.len(),
            project = sync.project.as_deref().unwrap_or("-"),
            dry_run = self.config.dry_run(),
            "Starting sync"
        );

        if self.config.dry_run() {
            let tracker = DryRunTracker::new(self.tracker.clone());
            Orchestrator::new(&tracker, sync).run_with_report().await
        } else {
            Orchestrator::new(&self.tracker, sync).run_with_report().await
        }
    }
}
