//! Read-only wrapper around another tracker.

use super::{IssueTracker, TrackerError};
use crate::model::{
    Field, FieldValue, Issue, IssueState, ItemContent, Label, NewIssue, Project, ProjectItem,
    RepoRef,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Forwards reads to the wrapped tracker and only logs writes.
///
/// Writes are answered with synthetic results so a whole pipeline can run
/// without mutating the destination.
#[derive(Debug)]
pub struct DryRunTracker<T> {
    inner: T,
    synthetic: AtomicU64,
}

impl<T> DryRunTracker<T> {
    /// Wraps a tracker.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            synthetic: AtomicU64::new(0),
        }
    }

    /// Returns the wrapped tracker.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn next_id(&self) -> u64 {
        self.synthetic.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl<T: IssueTracker> IssueTracker for DryRunTracker<T> {
    async fn list_issues(&self, repo: &RepoRef) -> Result<Vec<Issue>, TrackerError> {
        self.inner.list_issues(repo).await
    }

    async fn list_labels(&self, repo: &RepoRef) -> Result<Vec<Label>, TrackerError> {
        self.inner.list_labels(repo).await
    }

    async fn find_project(
        &self,
        owner: &str,
        title: &str,
    ) -> Result<Option<Project>, TrackerError> {
        self.inner.find_project(owner, title).await
    }

    async fn list_project_items(
        &self,
        project: &Project,
    ) -> Result<Vec<ProjectItem>, TrackerError> {
        self.inner.list_project_items(project).await
    }

    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue, TrackerError> {
        info!(repo = %repo, title = %issue.title, "[dry-run] Would create issue");
        Ok(Issue {
            number: 0,
            node_id: format!("dry-run-issue-{}", self.next_id()),
            title: issue.title.clone(),
            body: issue.body.clone(),
            state: IssueState::Open,
            assignees: issue.assignees.clone(),
            labels: Vec::new(),
            project_column: None,
        })
    }

    async fn set_issue_state(
        &self,
        repo: &RepoRef,
        number: u64,
        state: IssueState,
    ) -> Result<(), TrackerError> {
        info!(repo = %repo, number, state = state.as_str(), "[dry-run] Would set issue state");
        Ok(())
    }

    async fn add_labels(
        &self,
        repo: &RepoRef,
        number: u64,
        labels: &[String],
    ) -> Result<(), TrackerError> {
        info!(repo = %repo, number, labels = ?labels, "[dry-run] Would add labels");
        Ok(())
    }

    async fn add_assignees(
        &self,
        repo: &RepoRef,
        number: u64,
        assignees: &[String],
    ) -> Result<(), TrackerError> {
        info!(repo = %repo, number, assignees = ?assignees, "[dry-run] Would add assignees");
        Ok(())
    }

    async fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<(), TrackerError> {
        info!(
            repo = %repo,
            label = %label.name,
            color = %label.color,
            "[dry-run] Would create label"
        );
        Ok(())
    }

    async fn add_project_item(
        &self,
        project: &Project,
        repo: &RepoRef,
        issue: &Issue,
    ) -> Result<ProjectItem, TrackerError> {
        info!(
            project = %project.title,
            repo = %repo,
            number = issue.number,
            "[dry-run] Would add project item"
        );
        Ok(ProjectItem {
            id: format!("dry-run-item-{}", self.next_id()),
            content: Some(ItemContent {
                issue_node_id: issue.node_id.clone(),
                number: issue.number,
                title: issue.title.clone(),
                repository: repo.name.clone(),
            }),
            values: BTreeMap::new(),
        })
    }

    async fn set_field_value(
        &self,
        project: &Project,
        item_id: &str,
        field: &Field,
        value: &FieldValue,
    ) -> Result<(), TrackerError> {
        info!(
            project = %project.title,
            item = item_id,
            field = %field.name,
            value = %value,
            "[dry-run] Would set field value"
        );
        Ok(())
    }
}
