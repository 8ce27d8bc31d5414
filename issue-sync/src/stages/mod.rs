//! The four reconciliation passes.
//!
//! Each pass reads what it needs, applies its writes entity by entity and
//! records failures in a [`StageLog`] instead of aborting. Only a missing
//! precondition (no project, an unreadable project) ends a pass early with a
//! [`StageError`].

mod error;
pub mod issue_migration;
pub mod label_sync;
mod log;
pub mod project_fields;
pub mod project_labels;

pub use error::StageError;
pub use log::StageLog;

use crate::config::SyncConfig;
use crate::model::Project;
use crate::tracker::IssueTracker;
use serde::Serialize;
use std::fmt;

/// Pipeline position. Stages run in declaration order; [`Stage::Done`] is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    IssueMigration,
    LabelSync,
    ProjectLabelCreation,
    ProjectFieldSync,
    Done,
}

impl Stage {
    /// The first stage of every run.
    pub const FIRST: Self = Self::IssueMigration;

    /// Returns the stage after this one. `Done` stays `Done`.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::IssueMigration => Self::LabelSync,
            Self::LabelSync => Self::ProjectLabelCreation,
            Self::ProjectLabelCreation => Self::ProjectFieldSync,
            Self::ProjectFieldSync | Self::Done => Self::Done,
        }
    }

    /// Stable kebab-case name used in logs and reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::IssueMigration => "issue-migration",
            Self::LabelSync => "label-sync",
            Self::ProjectLabelCreation => "project-label-creation",
            Self::ProjectFieldSync => "project-field-sync",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves the configured project for `owner`.
async fn require_project<T: IssueTracker + ?Sized>(
    tracker: &T,
    config: &SyncConfig,
    owner: &str,
) -> Result<Project, StageError> {
    let title = config
        .project
        .as_deref()
        .ok_or(StageError::ProjectNotConfigured)?;
    tracker
        .find_project(owner, title)
        .await?
        .ok_or_else(|| StageError::ProjectNotFound {
            owner: owner.to_string(),
            title: title.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_advance_to_done() {
        let mut stage = Stage::FIRST;
        let mut seen = Vec::new();
        while stage != Stage::Done {
            seen.push(stage);
            stage = stage.next();
        }

        assert_eq!(
            seen,
            vec![
                Stage::IssueMigration,
                Stage::LabelSync,
                Stage::ProjectLabelCreation,
                Stage::ProjectFieldSync
            ]
        );
        assert_eq!(Stage::Done.next(), Stage::Done);
    }
}
