//! Stage 1: create missing destination issues and mirror state and assignees.

use super::{StageError, StageLog};
use crate::assignees::assignee_delta;
use crate::config::SyncConfig;
use crate::matching::{EntityMatcher, MatchTarget};
use crate::model::{Issue, IssueState, NewIssue, RepoPair, RepoRef};
use crate::tracker::{IssueTracker, TrackerError};
use tracing::{debug, info, info_span, warn, Instrument};

#[derive(Debug, Default)]
struct Counts {
    created: usize,
    matched: usize,
    updated: usize,
    scheduled_twice: usize,
    assignees_deferred: usize,
    failed: usize,
}

/// Issue created by [`create`].
#[derive(Debug)]
struct Created {
    number: u64,
    /// Assignees refused on creation and added separately afterwards.
    deferred: Vec<String>,
}

/// Runs issue migration for every configured repository pair.
///
/// # Errors
///
/// Never fails as a whole; per-repository and per-issue failures go to `log`.
pub async fn run<T: IssueTracker + ?Sized>(
    tracker: &T,
    config: &SyncConfig,
    log: &mut StageLog,
) -> Result<(), StageError> {
    for pair in config.repo_pairs() {
        let span = info_span!("migrate_issues", source = %pair.source, dest = %pair.dest);
        migrate_repository(tracker, &pair, log).instrument(span).await;
    }
    Ok(())
}

async fn migrate_repository<T: IssueTracker + ?Sized>(
    tracker: &T,
    pair: &RepoPair,
    log: &mut StageLog,
) {
    let (source, dest) = match list_pair(tracker, pair).await {
        Ok(lists) => lists,
        Err((repo, e)) => {
            log.failure(repo.to_string(), &e);
            return;
        }
    };
    info!(source = source.len(), dest = dest.len(), "Listed issues");

    let matcher = EntityMatcher::new(&dest);
    for collision in matcher.collisions() {
        warn!(
            title = %collision.normalized,
            kept = collision.kept,
            ignored = ?collision.ignored,
            "Destination issues share a title, matching the first"
        );
    }

    let mut counts = Counts::default();
    for issue_match in matcher.match_issues(&source) {
        match issue_match.target {
            MatchTarget::Existing(existing) => {
                counts.matched += 1;
                match reconcile_existing(tracker, &pair.dest, issue_match.source, existing).await {
                    Ok(true) => counts.updated += 1,
                    Ok(false) => {}
                    Err(e) => {
                        counts.failed += 1;
                        log.failure(format!("{}#{}", pair.dest, existing.number), &e);
                    }
                }
            }
            MatchTarget::Create(new) => match create(tracker, &pair.dest, &new).await {
                Ok(created) => {
                    counts.created += 1;
                    info!(number = created.number, title = %new.title, "Created issue");
                    if !created.deferred.is_empty() {
                        counts.assignees_deferred += 1;
                        log.line(format!(
                            "{}#{}: assignees {} refused on create, added separately",
                            pair.dest,
                            created.number,
                            created.deferred.join(", ")
                        ));
                    }
                }
                Err(e) => {
                    counts.failed += 1;
                    log.failure(format!("{} '{}'", pair.dest, new.title), &e);
                }
            },
            MatchTarget::AlreadyScheduled => {
                counts.scheduled_twice += 1;
                debug!(number = issue_match.source.number, "Title already scheduled for creation");
            }
        }
    }

    let mut line = format!(
        "{} -> {}: {} created, {} matched, {} updated",
        pair.source, pair.dest, counts.created, counts.matched, counts.updated
    );
    if counts.scheduled_twice > 0 {
        line.push_str(&format!(", {} duplicate source titles", counts.scheduled_twice));
    }
    if counts.assignees_deferred > 0 {
        line.push_str(&format!(", {} created without assignees", counts.assignees_deferred));
    }
    if counts.failed > 0 {
        line.push_str(&format!(", {} failed", counts.failed));
    }
    if !matcher.collisions().is_empty() {
        line.push_str(&format!(", {} title collisions", matcher.collisions().len()));
    }
    log.line(line);
}

async fn list_pair<T: IssueTracker + ?Sized>(
    tracker: &T,
    pair: &RepoPair,
) -> Result<(Vec<Issue>, Vec<Issue>), (RepoRef, TrackerError)> {
    let source = tracker
        .list_issues(&pair.source)
        .await
        .map_err(|e| (pair.source.clone(), e))?;
    let dest = tracker
        .list_issues(&pair.dest)
        .await
        .map_err(|e| (pair.dest.clone(), e))?;
    Ok((source, dest))
}

/// Creates an issue and closes it when the source is closed.
///
/// A creation refused with a validation error is retried without assignees,
/// which are then added separately; the remote ignores logins it cannot assign.
async fn create<T: IssueTracker + ?Sized>(
    tracker: &T,
    repo: &RepoRef,
    new: &NewIssue,
) -> Result<Created, TrackerError> {
    let (created, deferred) = match tracker.create_issue(repo, new).await {
        Ok(created) => (created, Vec::new()),
        Err(e) if e.is_invalid() && !new.assignees.is_empty() => {
            warn!(
                title = %new.title,
                assignees = ?new.assignees,
                error = %e,
                "Create refused, retrying without assignees"
            );
            let bare = NewIssue {
                assignees: Vec::new(),
                ..new.clone()
            };
            let created = tracker.create_issue(repo, &bare).await?;
            let assigned = tracker
                .add_assignees(repo, created.number, &new.assignees)
                .await;
            if let Err(e) = assigned {
                warn!(number = created.number, error = %e, "Could not add assignees");
            }
            (created, new.assignees.clone())
        }
        Err(e) => return Err(e),
    };

    if new.state == IssueState::Closed {
        tracker
            .set_issue_state(repo, created.number, IssueState::Closed)
            .await?;
    }
    Ok(Created {
        number: created.number,
        deferred,
    })
}

/// Mirrors state and adds missing assignees. Returns true if anything was written.
async fn reconcile_existing<T: IssueTracker + ?Sized>(
    tracker: &T,
    repo: &RepoRef,
    source: &Issue,
    dest: &Issue,
) -> Result<bool, TrackerError> {
    let mut changed = false;

    if source.state != dest.state {
        tracker.set_issue_state(repo, dest.number, source.state).await?;
        info!(number = dest.number, state = source.state.as_str(), "Updated issue state");
        changed = true;
    }

    let assignees = assignee_delta(source, dest);
    if !assignees.is_empty() {
        tracker.add_assignees(repo, dest.number, &assignees).await?;
        info!(number = dest.number, assignees = ?assignees, "Added assignees");
        changed = true;
    }

    Ok(changed)
}
