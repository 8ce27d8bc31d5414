//! Mirrors single-select project options as repository labels.
//!
//! Every option of every single-select field becomes a `Project: <option>`
//! label in the target repository, colored by [`ColorBucket`]. Existing
//! labels are left alone, so repeated runs create nothing new.

mod palette;

pub use palette::ColorBucket;

use crate::labels::project_label_name;
use crate::model::{FieldKind, Label, Project, RepoRef};
use crate::summary::EntityFailure;
use crate::tracker::{IssueTracker, TrackerError};
use tracing::{debug, info, warn};

/// Outcome of mirroring a project's options into one repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionLabelReport {
    /// Labels created by this call, in schema order.
    pub created: Vec<Label>,

    /// Option labels that already existed.
    pub existing: usize,

    /// Labels that could not be created.
    pub failures: Vec<EntityFailure>,
}

/// Builds the label mirroring a project option.
#[must_use]
pub fn option_label(option: &str) -> Label {
    let option = option.trim();
    Label::new(
        project_label_name(option),
        ColorBucket::for_option(option).color(),
        format!("Issue belongs to project field option: {option}"),
    )
}

/// Collects the option labels of a project, deduplicated, in schema order.
#[must_use]
pub fn option_labels(project: &Project) -> Vec<Label> {
    let mut labels: Vec<Label> = Vec::new();
    for field in project.single_select_fields() {
        let FieldKind::SingleSelect { options } = &field.kind else {
            continue;
        };
        for option in options {
            let label = option_label(&option.name);
            if !labels.iter().any(|l| l.name.eq_ignore_ascii_case(&label.name)) {
                labels.push(label);
            }
        }
    }
    labels
}

/// Ensures a label exists in `repo` for every single-select option of `project`.
///
/// # Errors
///
/// Returns an error only if the repository's label catalog cannot be read;
/// failures creating individual labels are collected in the report.
pub async fn ensure_labels_for_options<T: IssueTracker + ?Sized>(
    tracker: &T,
    project: &Project,
    repo: &RepoRef,
) -> Result<OptionLabelReport, TrackerError> {
    let catalog = tracker.list_labels(repo).await?;
    let mut report = OptionLabelReport::default();

    for label in option_labels(project) {
        if catalog.iter().any(|l| l.name.eq_ignore_ascii_case(&label.name)) {
            debug!(repo = %repo, label = %label.name, "Label already exists");
            report.existing += 1;
            continue;
        }

        match tracker.create_label(repo, &label).await {
            Ok(()) => {
                info!(repo = %repo, label = %label.name, color = %label.color, "Created label");
                report.created.push(label);
            }
            Err(e) if e.is_already_exists() => {
                debug!(repo = %repo, label = %label.name, "Label created concurrently");
                report.existing += 1;
            }
            Err(e) => {
                warn!(repo = %repo, label = %label.name, error = %e, "Failed to create label");
                report
                    .failures
                    .push(EntityFailure::new(format!("{repo} label '{}'", label.name), &e));
            }
        }
    }

    Ok(report)
}
