//! Stage 2: add missing labels to matched destination issues.
//!
//! Source issues are annotated with their project column first, so the
//! synthesized `Project: <column>` label travels with the other labels. A
//! column label missing from the destination catalog is created with its
//! palette color before it is applied.

use super::{StageError, StageLog};
use crate::config::SyncConfig;
use crate::labels::{project_label_name, LabelDeltaComputer, SizingLabels};
use crate::matching::{EntityMatcher, MatchTarget};
use crate::model::{FieldValue, Issue, Label, RepoPair, RepoRef};
use crate::project_labels::option_label;
use crate::tracker::{IssueTracker, TrackerError};
use std::collections::HashMap;
use tracing::{debug, info, info_span, warn, Instrument};

/// Project column of each source issue, keyed by repository name and number.
pub type ColumnIndex = HashMap<(String, u64), String>;

/// Runs label sync for every configured repository pair.
///
/// # Errors
///
/// Never fails as a whole; a missing source project only disables column labels.
pub async fn run<T: IssueTracker + ?Sized>(
    tracker: &T,
    config: &SyncConfig,
    log: &mut StageLog,
) -> Result<(), StageError> {
    let columns = match project_columns(tracker, config).await {
        Ok(columns) => columns,
        Err(e) => {
            warn!(error = %e, "Project columns unavailable, continuing without them");
            log.line(format!("project columns unavailable: {e}"));
            ColumnIndex::new()
        }
    };

    let computer = LabelDeltaComputer::new(
        SizingLabels::new(&config.sizing_prefixes),
        config.label_case_insensitive,
    );

    for pair in config.repo_pairs() {
        let span = info_span!("sync_labels", source = %pair.source, dest = %pair.dest);
        sync_repository(tracker, &pair, &computer, &columns, log)
            .instrument(span)
            .await;
    }
    Ok(())
}

/// Reads the source project and indexes each issue's column.
///
/// Returns an empty index when no project is configured.
///
/// # Errors
///
/// Returns [`StageError`] if the source project is missing or unreadable.
pub async fn project_columns<T: IssueTracker + ?Sized>(
    tracker: &T,
    config: &SyncConfig,
) -> Result<ColumnIndex, StageError> {
    if config.project.is_none() {
        return Ok(ColumnIndex::new());
    }
    let project = super::require_project(tracker, config, &config.source_org).await?;
    if project.field(&config.column_field).is_none() {
        warn!(
            field = %config.column_field,
            project = %project.title,
            "Column field not in source project"
        );
        return Ok(ColumnIndex::new());
    }

    let mut columns = ColumnIndex::new();
    for item in tracker.list_project_items(&project).await? {
        let (Some(content), Some(FieldValue::SingleSelect(column))) =
            (&item.content, item.value(&config.column_field))
        else {
            continue;
        };
        columns.insert((content.repository.clone(), content.number), column.clone());
    }
    info!(issues = columns.len(), "Indexed project columns");
    Ok(columns)
}

async fn sync_repository<T: IssueTracker + ?Sized>(
    tracker: &T,
    pair: &RepoPair,
    computer: &LabelDeltaComputer,
    columns: &ColumnIndex,
    log: &mut StageLog,
) {
    let (source, dest, mut catalog) = match read_pair(tracker, pair).await {
        Ok(lists) => lists,
        Err((repo, e)) => {
            log.failure(repo, &e);
            return;
        }
    };

    let source: Vec<Issue> = source
        .into_iter()
        .map(|mut issue| {
            if let Some(column) = columns.get(&(pair.source.name.clone(), issue.number)) {
                issue.project_column = Some(column.clone());
            }
            issue
        })
        .collect();

    let matcher = EntityMatcher::new(&dest);
    let (mut labelled, mut added, mut unmatched, mut failed) = (0usize, 0usize, 0usize, 0usize);
    let mut columns_created = 0usize;

    for issue_match in matcher.match_issues(&source) {
        let MatchTarget::Existing(existing) = issue_match.target else {
            unmatched += 1;
            continue;
        };

        let mut delta = computer.delta(issue_match.source, &catalog, existing);
        if let Some(column) = &issue_match.source.project_column {
            let name = project_label_name(column);
            if delta.contains(&name) {
                match ensure_column_label(tracker, &pair.dest, column, &mut catalog).await {
                    Ok(true) => columns_created += 1,
                    Ok(false) => {}
                    Err(e) => {
                        failed += 1;
                        log.failure(format!("{} label '{name}'", pair.dest), &e);
                        delta.retain(|label| *label != name);
                    }
                }
            }
        }
        if delta.is_empty() {
            continue;
        }

        match tracker.add_labels(&pair.dest, existing.number, &delta).await {
            Ok(()) => {
                debug!(number = existing.number, labels = ?delta, "Added labels");
                labelled += 1;
                added += delta.len();
            }
            Err(e) => {
                failed += 1;
                log.failure(format!("{}#{}", pair.dest, existing.number), &e);
            }
        }
    }

    info!(labelled, added, unmatched, failed, "Labels synchronized");
    let mut line = format!(
        "{}: {labelled} issues labelled, {added} labels added, {unmatched} unmatched",
        pair.dest
    );
    if columns_created > 0 {
        line.push_str(&format!(", {columns_created} column labels created"));
    }
    if failed > 0 {
        line.push_str(&format!(", {failed} failed"));
    }
    log.line(line);
}

/// Creates the palette-colored label for `column` unless the catalog has it.
///
/// Returns true if a label was created.
async fn ensure_column_label<T: IssueTracker + ?Sized>(
    tracker: &T,
    repo: &RepoRef,
    column: &str,
    catalog: &mut Vec<Label>,
) -> Result<bool, TrackerError> {
    let label = option_label(column);
    if catalog.iter().any(|l| l.name.eq_ignore_ascii_case(&label.name)) {
        return Ok(false);
    }

    let created = match tracker.create_label(repo, &label).await {
        Ok(()) => {
            info!(repo = %repo, label = %label.name, color = %label.color, "Created column label");
            true
        }
        Err(e) if e.is_already_exists() => false,
        Err(e) => return Err(e),
    };
    catalog.push(label);
    Ok(created)
}

async fn read_pair<T: IssueTracker + ?Sized>(
    tracker: &T,
    pair: &RepoPair,
) -> Result<(Vec<Issue>, Vec<Issue>, Vec<Label>), (String, TrackerError)> {
    let source = tracker
        .list_issues(&pair.source)
        .await
        .map_err(|e| (pair.source.to_string(), e))?;
    let dest = tracker
        .list_issues(&pair.dest)
        .await
        .map_err(|e| (pair.dest.to_string(), e))?;
    let catalog = tracker
        .list_labels(&pair.dest)
        .await
        .map_err(|e| (pair.dest.to_string(), e))?;
    Ok((source, dest, catalog))
}
