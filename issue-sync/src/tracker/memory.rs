//! Deterministic in-process [`IssueTracker`].
//!
//! Holds repositories, label catalogs and projects in memory and records
//! every write it receives. Writes for chosen issues can be made to fail,
//! and repositories can refuse assignees on issue creation. The integration
//! tests drive the whole pipeline against it.

use super::{IssueTracker, TrackerError};
use crate::model::{
    names_match, Field, FieldValue, Issue, IssueState, ItemContent, Label, NewIssue, Project,
    ProjectItem, RepoRef,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Color GitHub gives labels created implicitly by labelling an issue.
const IMPLICIT_LABEL_COLOR: &str = "ededed";

/// Error injected into writes touching one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// The issue behaves as deleted.
    NotFound,
    /// The remote refuses the call because of rate limiting.
    RateLimited,
}

impl InjectedFailure {
    fn error(self, repo: &RepoRef, number: u64) -> TrackerError {
        match self {
            Self::NotFound => TrackerError::not_found(format!("issue {repo}#{number}")),
            Self::RateLimited => TrackerError::RateLimited {
                message: format!("API rate limit exceeded writing {repo}#{number}"),
            },
        }
    }
}

/// A write received by an [`InMemoryTracker`].
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    CreateIssue {
        repo: RepoRef,
        title: String,
    },
    SetIssueState {
        repo: RepoRef,
        number: u64,
        state: IssueState,
    },
    AddLabels {
        repo: RepoRef,
        number: u64,
        labels: Vec<String>,
    },
    AddAssignees {
        repo: RepoRef,
        number: u64,
        assignees: Vec<String>,
    },
    CreateLabel {
        repo: RepoRef,
        label: Label,
    },
    AddProjectItem {
        project: String,
        issue: String,
    },
    SetFieldValue {
        project: String,
        item: String,
        field: String,
        value: FieldValue,
    },
}

#[derive(Debug, Default)]
struct RepoState {
    issues: Vec<Issue>,
    labels: Vec<Label>,
}

#[derive(Debug)]
struct ProjectState {
    project: Project,
    items: Vec<ProjectItem>,
}

#[derive(Debug, Default)]
struct State {
    repos: BTreeMap<RepoRef, RepoState>,
    projects: Vec<ProjectState>,
    failing: BTreeMap<(RepoRef, u64), InjectedFailure>,
    unassignable: BTreeSet<(RepoRef, String)>,
    writes: Vec<Write>,
    next_item: u64,
}

impl State {
    fn repo(&self, repo: &RepoRef) -> Result<&RepoState, TrackerError> {
        self.repos
            .get(repo)
            .ok_or_else(|| TrackerError::not_found(format!("repository {repo}")))
    }

    fn repo_mut(&mut self, repo: &RepoRef) -> Result<&mut RepoState, TrackerError> {
        self.repos
            .get_mut(repo)
            .ok_or_else(|| TrackerError::not_found(format!("repository {repo}")))
    }

    /// Resolves an issue for writing, honouring injected failures.
    fn issue_mut(&mut self, repo: &RepoRef, number: u64) -> Result<&mut Issue, TrackerError> {
        self.check_failure(repo, number)?;
        self.repo_mut(repo)?
            .issues
            .iter_mut()
            .find(|issue| issue.number == number)
            .ok_or_else(|| TrackerError::not_found(format!("issue {repo}#{number}")))
    }

    fn check_failure(&self, repo: &RepoRef, number: u64) -> Result<(), TrackerError> {
        match self.failing.get(&(repo.clone(), number)) {
            Some(failure) => Err(failure.error(repo, number)),
            None => Ok(()),
        }
    }

    fn assignable(&self, repo: &RepoRef, login: &str) -> bool {
        !self.unassignable.contains(&(repo.clone(), login.to_string()))
    }

    fn project(&self, id: &str) -> Result<&ProjectState, TrackerError> {
        self.projects
            .iter()
            .find(|p| p.project.id == id)
            .ok_or_else(|| TrackerError::not_found(format!("project {id}")))
    }

    fn project_mut(&mut self, id: &str) -> Result<&mut ProjectState, TrackerError> {
        self.projects
            .iter_mut()
            .find(|p| p.project.id == id)
            .ok_or_else(|| TrackerError::not_found(format!("project {id}")))
    }
}

/// In-memory [`IssueTracker`] for tests and local experiments.
#[derive(Debug, Default)]
pub struct InMemoryTracker {
    state: Mutex<State>,
}

impl InMemoryTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an empty repository.
    pub fn add_repo(&self, repo: &RepoRef) {
        self.state().repos.entry(repo.clone()).or_default();
    }

    /// Seeds an issue, registering the repository if needed.
    pub fn insert_issue(&self, repo: &RepoRef, issue: Issue) {
        self.state()
            .repos
            .entry(repo.clone())
            .or_default()
            .issues
            .push(issue);
    }

    /// Seeds a label, registering the repository if needed.
    pub fn insert_label(&self, repo: &RepoRef, label: Label) {
        self.state()
            .repos
            .entry(repo.clone())
            .or_default()
            .labels
            .push(label);
    }

    /// Seeds a project. It is found under its scope's login.
    pub fn insert_project(&self, project: Project) {
        self.state().projects.push(ProjectState {
            project,
            items: Vec::new(),
        });
    }

    /// Seeds an item of a previously inserted project.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] if the project is unknown.
    pub fn insert_project_item(
        &self,
        project_id: &str,
        item: ProjectItem,
    ) -> Result<(), TrackerError> {
        self.state().project_mut(project_id)?.items.push(item);
        Ok(())
    }

    /// Makes every write touching the given issue fail with `failure`.
    pub fn fail_issue(&self, repo: &RepoRef, number: u64, failure: InjectedFailure) {
        self.state().failing.insert((repo.clone(), number), failure);
    }

    /// Makes `login` unknown to `repo`.
    ///
    /// Creating an issue assigned to it fails with [`TrackerError::Invalid`];
    /// adding it as an assignee later is silently ignored.
    pub fn reject_assignee(&self, repo: &RepoRef, login: &str) {
        self.state()
            .unassignable
            .insert((repo.clone(), login.to_string()));
    }

    /// Returns the writes received so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<Write> {
        self.state().writes.clone()
    }

    /// Forgets the recorded writes.
    pub fn clear_writes(&self) {
        self.state().writes.clear();
    }

    /// Returns the current issues of a repository.
    #[must_use]
    pub fn issues(&self, repo: &RepoRef) -> Vec<Issue> {
        self.state()
            .repos
            .get(repo)
            .map(|r| r.issues.clone())
            .unwrap_or_default()
    }

    /// Returns the current label catalog of a repository.
    #[must_use]
    pub fn labels(&self, repo: &RepoRef) -> Vec<Label> {
        self.state()
            .repos
            .get(repo)
            .map(|r| r.labels.clone())
            .unwrap_or_default()
    }

    /// Returns the current items of a project.
    #[must_use]
    pub fn project_items(&self, project_id: &str) -> Vec<ProjectItem> {
        self.state()
            .project(project_id)
            .map(|p| p.items.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IssueTracker for InMemoryTracker {
    async fn list_issues(&self, repo: &RepoRef) -> Result<Vec<Issue>, TrackerError> {
        Ok(self.state().repo(repo)?.issues.clone())
    }

    async fn list_labels(&self, repo: &RepoRef) -> Result<Vec<Label>, TrackerError> {
        Ok(self.state().repo(repo)?.labels.clone())
    }

    async fn find_project(
        &self,
        owner: &str,
        title: &str,
    ) -> Result<Option<Project>, TrackerError> {
        Ok(self
            .state()
            .projects
            .iter()
            .map(|p| &p.project)
            .find(|p| p.scope.login() == owner && names_match(&p.title, title))
            .cloned())
    }

    async fn list_project_items(
        &self,
        project: &Project,
    ) -> Result<Vec<ProjectItem>, TrackerError> {
        Ok(self.state().project(&project.id)?.items.clone())
    }

    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue, TrackerError> {
        let mut state = self.state();
        state.repo(repo)?;
        if let Some(login) = issue.assignees.iter().find(|l| !state.assignable(repo, l)) {
            return Err(TrackerError::Invalid {
                message: format!("Validation Failed: user '{login}' could not be found"),
            });
        }
        let entry = state.repo_mut(repo)?;
        let number = entry.issues.iter().map(|i| i.number).max().unwrap_or(0) + 1;
        let created = Issue {
            number,
            node_id: format!("I_{}_{}_{number}", repo.owner, repo.name),
            title: issue.title.clone(),
            body: issue.body.clone(),
            state: IssueState::Open,
            assignees: issue.assignees.clone(),
            labels: Vec::new(),
            project_column: None,
        };
        entry.issues.push(created.clone());
        state.writes.push(Write::CreateIssue {
            repo: repo.clone(),
            title: issue.title.clone(),
        });
        Ok(created)
    }

    async fn set_issue_state(
        &self,
        repo: &RepoRef,
        number: u64,
        state: IssueState,
    ) -> Result<(), TrackerError> {
        let mut guard = self.state();
        guard.issue_mut(repo, number)?.state = state;
        guard.writes.push(Write::SetIssueState {
            repo: repo.clone(),
            number,
            state,
        });
        Ok(())
    }

    async fn add_labels(
        &self,
        repo: &RepoRef,
        number: u64,
        labels: &[String],
    ) -> Result<(), TrackerError> {
        let mut state = self.state();
        let issue = state.issue_mut(repo, number)?;
        for label in labels {
            if !issue.labels.contains(label) {
                issue.labels.push(label.clone());
            }
        }

        let catalog = &mut state.repo_mut(repo)?.labels;
        for label in labels {
            if !catalog.iter().any(|l| l.name.eq_ignore_ascii_case(label)) {
                catalog.push(Label::new(label.clone(), IMPLICIT_LABEL_COLOR, ""));
            }
        }

        state.writes.push(Write::AddLabels {
            repo: repo.clone(),
            number,
            labels: labels.to_vec(),
        });
        Ok(())
    }

    async fn add_assignees(
        &self,
        repo: &RepoRef,
        number: u64,
        assignees: &[String],
    ) -> Result<(), TrackerError> {
        let mut state = self.state();
        let accepted: Vec<&String> = assignees
            .iter()
            .filter(|login| state.assignable(repo, login))
            .collect();
        let issue = state.issue_mut(repo, number)?;
        for login in accepted {
            if !issue.assignees.contains(login) {
                issue.assignees.push(login.clone());
            }
        }
        state.writes.push(Write::AddAssignees {
            repo: repo.clone(),
            number,
            assignees: assignees.to_vec(),
        });
        Ok(())
    }

    async fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<(), TrackerError> {
        let mut state = self.state();
        let catalog = &mut state.repo_mut(repo)?.labels;
        if catalog.iter().any(|l| l.name.eq_ignore_ascii_case(&label.name)) {
            return Err(TrackerError::AlreadyExists {
                what: format!("label '{}' in {repo}", label.name),
            });
        }
        catalog.push(label.clone());
        state.writes.push(Write::CreateLabel {
            repo: repo.clone(),
            label: label.clone(),
        });
        Ok(())
    }

    async fn add_project_item(
        &self,
        project: &Project,
        repo: &RepoRef,
        issue: &Issue,
    ) -> Result<ProjectItem, TrackerError> {
        let mut state = self.state();
        state.check_failure(repo, issue.number)?;
        state.project(&project.id)?;
        state.writes.push(Write::AddProjectItem {
            project: project.id.clone(),
            issue: issue.node_id.clone(),
        });
        state.next_item += 1;
        let next_item = state.next_item;

        let entry = state.project_mut(&project.id)?;
        let existing = entry.items.iter().find(|item| {
            item.content
                .as_ref()
                .is_some_and(|c| c.issue_node_id == issue.node_id)
        });
        if let Some(item) = existing {
            return Ok(item.clone());
        }

        let item = ProjectItem {
            id: format!("PVTI_{next_item}"),
            content: Some(ItemContent {
                issue_node_id: issue.node_id.clone(),
                number: issue.number,
                title: issue.title.clone(),
                repository: repo.name.clone(),
            }),
            values: BTreeMap::new(),
        };
        entry.items.push(item.clone());
        Ok(item)
    }

    async fn set_field_value(
        &self,
        project: &Project,
        item_id: &str,
        field: &Field,
        value: &FieldValue,
    ) -> Result<(), TrackerError> {
        let mut state = self.state();
        let entry = state.project_mut(&project.id)?;
        let schema_field = entry
            .project
            .fields
            .iter()
            .find(|f| f.id == field.id)
            .ok_or_else(|| TrackerError::not_found(format!("field {}", field.name)))?;

        let stored = match value {
            FieldValue::SingleSelect(name) => {
                let option = schema_field.option(name).ok_or_else(|| {
                    TrackerError::not_found(format!("option '{name}' of field '{}'", field.name))
                })?;
                FieldValue::SingleSelect(option.name.clone())
            }
            other => other.clone(),
        };
        let field_name = schema_field.name.clone();

        let item = entry
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| TrackerError::not_found(format!("project item {item_id}")))?;
        item.values.insert(field_name.clone(), stored);

        state.writes.push(Write::SetFieldValue {
            project: project.id.clone(),
            item: item_id.to_string(),
            field: field_name,
            value: value.clone(),
        });
        Ok(())
    }
}
