//! Stage 3: create a label for every single-select option of the destination project.

use super::{require_project, StageError, StageLog};
use crate::config::SyncConfig;
use crate::project_labels::ensure_labels_for_options;
use crate::tracker::IssueTracker;
use tracing::{info, info_span, Instrument};

/// Mirrors the destination project's options into every destination repository.
///
/// # Errors
///
/// Returns [`StageError`] if no project is configured or the destination
/// project cannot be resolved.
pub async fn run<T: IssueTracker + ?Sized>(
    tracker: &T,
    config: &SyncConfig,
    log: &mut StageLog,
) -> Result<(), StageError> {
    let project = require_project(tracker, config, &config.dest_org).await?;
    info!(project = %project.title, scope = %project.scope, "Mirroring project options");

    for pair in config.repo_pairs() {
        let span = info_span!("project_labels", dest = %pair.dest);
        let outcome = ensure_labels_for_options(tracker, &project, &pair.dest)
            .instrument(span)
            .await;

        match outcome {
            Ok(report) => {
                let mut line = format!(
                    "{}: {} labels created, {} already present",
                    pair.dest,
                    report.created.len(),
                    report.existing
                );
                if !report.failures.is_empty() {
                    line.push_str(&format!(", {} failed", report.failures.len()));
                }
                log.line(line);
                log.extend_failures(report.failures);
            }
            Err(e) => log.failure(pair.dest.to_string(), &e),
        }
    }
    Ok(())
}
