//! Stage 4: copy project field values from source items to destination items.

use super::{require_project, StageError, StageLog};
use crate::config::SyncConfig;
use crate::matching::EntityMatcher;
use crate::model::{ProjectItem, RepoPair};
use crate::project_fields::{FieldSkip, ProjectItemFieldSync, ProjectPair};
use crate::tracker::IssueTracker;
use tracing::{debug, info, info_span, warn, Instrument};

#[derive(Debug, Default)]
struct Counts {
    synced: usize,
    added: usize,
    updated: usize,
    skipped: usize,
    unmatched: usize,
    failed: usize,
}

/// Synchronizes field values for every source item whose issue lives in a configured repository.
///
/// # Errors
///
/// Returns [`StageError`] if no project is configured, either project cannot
/// be resolved or either item listing cannot be read.
pub async fn run<T: IssueTracker + ?Sized>(
    tracker: &T,
    config: &SyncConfig,
    log: &mut StageLog,
) -> Result<(), StageError> {
    let source_project = require_project(tracker, config, &config.source_org).await?;
    let dest_project = require_project(tracker, config, &config.dest_org).await?;
    let source_items = tracker.list_project_items(&source_project).await?;
    let mut dest_items = tracker.list_project_items(&dest_project).await?;
    info!(
        source_items = source_items.len(),
        dest_items = dest_items.len(),
        "Listed project items"
    );

    let pairs = config.repo_pairs();
    let non_issue = source_items.iter().filter(|i| i.content.is_none()).count();
    let out_of_scope = source_items
        .iter()
        .filter_map(|i| i.content.as_ref())
        .filter(|c| !pairs.iter().any(|p| p.source.name == c.repository))
        .count();

    let sync = ProjectItemFieldSync::new(config.fields.clone());
    let context = Context {
        sync: &sync,
        projects: ProjectPair {
            source: &source_project,
            dest: &dest_project,
        },
    };

    for pair in &pairs {
        let span = info_span!("sync_fields", source = %pair.source, dest = %pair.dest);
        sync_repository(tracker, &context, pair, &source_items, &mut dest_items, log)
            .instrument(span)
            .await;
    }

    if non_issue > 0 || out_of_scope > 0 {
        log.line(format!(
            "{non_issue} non-issue items, {out_of_scope} items outside configured repositories"
        ));
    }
    Ok(())
}

struct Context<'a> {
    sync: &'a ProjectItemFieldSync,
    projects: ProjectPair<'a>,
}

async fn sync_repository<T: IssueTracker + ?Sized>(
    tracker: &T,
    context: &Context<'_>,
    pair: &RepoPair,
    source_items: &[ProjectItem],
    dest_items: &mut Vec<ProjectItem>,
    log: &mut StageLog,
) {
    let dest_issues = match tracker.list_issues(&pair.dest).await {
        Ok(issues) => issues,
        Err(e) => {
            log.failure(pair.dest.to_string(), &e);
            return;
        }
    };
    let matcher = EntityMatcher::new(&dest_issues);
    let mut counts = Counts::default();

    let items = source_items.iter().filter_map(|item| {
        item.content
            .as_ref()
            .filter(|c| c.repository == pair.source.name)
            .map(|c| (item, c))
    });

    for (item, content) in items {
        let Some(dest_issue) = matcher.find(&content.title) else {
            debug!(
                number = content.number,
                title = %content.title,
                "No destination issue for item"
            );
            counts.unmatched += 1;
            continue;
        };

        let outcome = context
            .sync
            .sync(
                tracker,
                context.projects,
                item,
                &pair.dest,
                dest_issue,
                dest_items,
            )
            .await;

        match outcome {
            Ok(report) => {
                counts.synced += 1;
                counts.added += usize::from(report.item_added);
                counts.updated += report.updated.len();
                counts.skipped += report.skipped.len();
                for skip in &report.skipped {
                    match skip {
                        FieldSkip::MissingField { .. } => {
                            debug!(number = dest_issue.number, reason = %skip, "Field skipped");
                        }
                        _ => warn!(number = dest_issue.number, reason = %skip, "Field skipped"),
                    }
                }
            }
            Err(e) => {
                counts.failed += 1;
                log.failure(format!("{}#{}", pair.dest, dest_issue.number), &e);
            }
        }
    }

    info!(
        synced = counts.synced,
        updated = counts.updated,
        skipped = counts.skipped,
        "Project fields synchronized"
    );
    let mut line = format!(
        "{}: {} items synced, {} added to project, {} fields updated, {} fields skipped, \
         {} unmatched",
        pair.dest,
        counts.synced,
        counts.added,
        counts.updated,
        counts.skipped,
        counts.unmatched
    );
    if counts.failed > 0 {
        line.push_str(&format!(", {} failed", counts.failed));
    }
    log.line(line);
}
