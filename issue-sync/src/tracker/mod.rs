//! The remote issue-tracker client seam.
//!
//! Every reconciliation pass talks to the tracker only through
//! [`IssueTracker`]. [`GitHubTracker`] is the production implementation,
//! [`InMemoryTracker`] a deterministic in-process one and [`DryRunTracker`]
//! a wrapper that forwards reads and only logs writes.

mod dry_run;
mod error;
pub mod github;
pub mod memory;

pub use dry_run::DryRunTracker;
pub use error::TrackerError;
pub use github::GitHubTracker;
pub use memory::{InMemoryTracker, InjectedFailure};

use crate::model::{
    Field, FieldValue, Issue, IssueState, Label, NewIssue, Project, ProjectItem, RepoRef,
};
use async_trait::async_trait;

/// Read and write operations the reconciliation core needs from a tracker.
///
/// Implementations are responsible for pagination and rate-limit handling;
/// callers treat every error as scoped to the entity being processed.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Lists every issue (open and closed) in a repository, pull requests excluded.
    async fn list_issues(&self, repo: &RepoRef) -> Result<Vec<Issue>, TrackerError>;

    /// Lists the label catalog of a repository.
    async fn list_labels(&self, repo: &RepoRef) -> Result<Vec<Label>, TrackerError>;

    /// Resolves a project by title within an owner, schema included.
    async fn find_project(&self, owner: &str, title: &str)
        -> Result<Option<Project>, TrackerError>;

    /// Lists the items of a project with their field values.
    async fn list_project_items(&self, project: &Project)
        -> Result<Vec<ProjectItem>, TrackerError>;

    /// Creates an issue. The new issue is open; callers apply the state afterwards.
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue, TrackerError>;

    /// Closes or reopens an issue.
    async fn set_issue_state(
        &self,
        repo: &RepoRef,
        number: u64,
        state: IssueState,
    ) -> Result<(), TrackerError>;

    /// Adds labels to an issue, keeping the ones it already has.
    async fn add_labels(
        &self,
        repo: &RepoRef,
        number: u64,
        labels: &[String],
    ) -> Result<(), TrackerError>;

    /// Adds assignees to an issue, keeping the ones it already has.
    async fn add_assignees(
        &self,
        repo: &RepoRef,
        number: u64,
        assignees: &[String],
    ) -> Result<(), TrackerError>;

    /// Creates a label in a repository's catalog.
    async fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<(), TrackerError>;

    /// Adds an issue to a project and returns the resulting item.
    async fn add_project_item(
        &self,
        project: &Project,
        repo: &RepoRef,
        issue: &Issue,
    ) -> Result<ProjectItem, TrackerError>;

    /// Sets the value of one field on a project item.
    async fn set_field_value(
        &self,
        project: &Project,
        item_id: &str,
        field: &Field,
        value: &FieldValue,
    ) -> Result<(), TrackerError>;
}
