//! [`IssueTracker`] backed by the GitHub REST and GraphQL APIs.
//!
//! Issues, labels, assignees and issue state go through the REST API;
//! Projects-V2 lookup, schema, items and field writes go through GraphQL.
//! Listings are fully paginated before they are returned.

mod graphql;
mod rate_limit;

pub use rate_limit::RateLimitInfo;

use self::graphql::{
    AddItemData, Connection, NodeData, OwnerData, ProjectFields, ProjectItems, ProjectNode,
    Response,
};
use self::rate_limit::ensure_core_rate_limit;
use super::{IssueTracker, TrackerError};
use crate::model::{
    Field, FieldValue, Issue, IssueState, ItemContent, Label, NewIssue, Project, ProjectItem,
    ProjectScope, RepoRef,
};
use async_trait::async_trait;
use octocrab::{models, params, Octocrab};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// GitHub implementation of [`IssueTracker`].
#[derive(Debug, Clone)]
pub struct GitHubTracker {
    octocrab: Octocrab,
}

impl GitHubTracker {
    /// Creates a tracker authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Api`] if the client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self, TrackerError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .map_err(TrackerError::Api)?;
        Ok(Self { octocrab })
    }

    /// Wraps an already configured client.
    #[must_use]
    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Runs a GraphQL document and unwraps its envelope.
    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, TrackerError> {
        let response: Response<T> = self
            .octocrab
            .graphql(&json!({ "query": query, "variables": variables }))
            .await?;
        response.into_result()
    }

    /// Collects every node of a cursor-paginated connection.
    async fn paginate<T, N>(
        &self,
        query: &str,
        mut variables: Value,
        connection: impl Fn(T) -> Result<Connection<N>, TrackerError>,
    ) -> Result<Vec<N>, TrackerError>
    where
        T: DeserializeOwned,
    {
        let mut nodes = Vec::new();
        loop {
            let page = connection(self.graphql(query, variables.clone()).await?)?;
            nodes.extend(page.nodes.into_iter().flatten());
            match page.page_info.end_cursor {
                Some(cursor) if page.page_info.has_next_page => {
                    variables["after"] = Value::String(cursor);
                }
                _ => return Ok(nodes),
            }
        }
    }

    /// Searches the projects of one owner scope by title.
    async fn find_in_scope(
        &self,
        scope: &ProjectScope,
        title: &str,
    ) -> Result<Option<ProjectNode>, TrackerError> {
        let query = match scope {
            ProjectScope::Organization(_) => graphql::ORGANIZATION_PROJECTS,
            ProjectScope::User(_) => graphql::USER_PROJECTS,
        };
        let login = scope.login().to_string();
        let projects = self
            .paginate(query, json!({ "login": scope.login() }), |data: OwnerData| {
                data.owner
                    .map(|owner| owner.projects)
                    .ok_or_else(|| TrackerError::not_found(format!("owner {login}")))
            })
            .await?;

        Ok(projects
            .into_iter()
            .find(|project| crate::model::names_match(&project.title, title)))
    }

    /// Reads the supported fields of a project.
    async fn project_fields(&self, project_id: &str) -> Result<Vec<Field>, TrackerError> {
        let raw = self
            .paginate(
                graphql::PROJECT_FIELDS,
                json!({ "id": project_id }),
                |data: NodeData<ProjectFields>| {
                    data.node
                        .map(|node| node.fields)
                        .ok_or_else(|| TrackerError::not_found(format!("project {project_id}")))
                },
            )
            .await?;
        Ok(raw.into_iter().filter_map(|field| field.into_field()).collect())
    }
}

fn convert_issue(issue: models::issues::Issue) -> Issue {
    let state = match issue.state {
        models::IssueState::Closed => IssueState::Closed,
        _ => IssueState::Open,
    };
    Issue {
        number: issue.number,
        node_id: issue.node_id,
        title: issue.title,
        body: issue.body,
        state,
        assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
        labels: issue.labels.into_iter().map(|l| l.name).collect(),
        project_column: None,
    }
}

fn to_remote_state(state: IssueState) -> models::IssueState {
    match state {
        IssueState::Open => models::IssueState::Open,
        IssueState::Closed => models::IssueState::Closed,
    }
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    async fn list_issues(&self, repo: &RepoRef) -> Result<Vec<Issue>, TrackerError> {
        debug!(repo = %repo, "Listing issues");
        let page = self
            .octocrab
            .issues(&repo.owner, &repo.name)
            .list()
            .state(params::State::All)
            .per_page(100)
            .send()
            .await?;
        let issues = self.octocrab.all_pages(page).await?;

        Ok(issues
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(convert_issue)
            .collect())
    }

    async fn list_labels(&self, repo: &RepoRef) -> Result<Vec<Label>, TrackerError> {
        debug!(repo = %repo, "Listing labels");
        let page = self
            .octocrab
            .issues(&repo.owner, &repo.name)
            .list_labels_for_repo()
            .per_page(100)
            .send()
            .await?;
        let labels = self.octocrab.all_pages(page).await?;

        Ok(labels
            .into_iter()
            .map(|label| Label::new(label.name, label.color, label.description.unwrap_or_default()))
            .collect())
    }

    async fn find_project(
        &self,
        owner: &str,
        title: &str,
    ) -> Result<Option<Project>, TrackerError> {
        let scopes = [
            ProjectScope::Organization(owner.to_string()),
            ProjectScope::User(owner.to_string()),
        ];

        for scope in scopes {
            let found = match self.find_in_scope(&scope, title).await {
                Ok(found) => found,
                Err(e) if e.is_not_found() => {
                    debug!(scope = %scope, "Owner scope not found");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(node) = found {
                let fields = self.project_fields(&node.id).await?;
                info!(
                    scope = %scope,
                    project = %node.title,
                    fields = fields.len(),
                    "Resolved project"
                );
                return Ok(Some(node.into_project(scope, fields)));
            }
        }
        Ok(None)
    }

    async fn list_project_items(
        &self,
        project: &Project,
    ) -> Result<Vec<ProjectItem>, TrackerError> {
        debug!(project = %project.title, "Listing project items");
        let raw = self
            .paginate(
                graphql::PROJECT_ITEMS,
                json!({ "id": project.id }),
                |data: NodeData<ProjectItems>| {
                    data.node.map(|node| node.items).ok_or_else(|| {
                        TrackerError::not_found(format!("project {}", project.title))
                    })
                },
            )
            .await?;
        Ok(raw.into_iter().map(|item| item.into_item(&project.fields)).collect())
    }

    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue, TrackerError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let issues = self.octocrab.issues(&repo.owner, &repo.name);
        let mut builder = issues.create(&issue.title);
        if let Some(body) = &issue.body {
            builder = builder.body(body);
        }
        if !issue.assignees.is_empty() {
            builder = builder.assignees(issue.assignees.clone());
        }
        let created = builder.send().await?;
        Ok(convert_issue(created))
    }

    async fn set_issue_state(
        &self,
        repo: &RepoRef,
        number: u64,
        state: IssueState,
    ) -> Result<(), TrackerError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .update(number)
            .state(to_remote_state(state))
            .send()
            .await?;
        Ok(())
    }

    async fn add_labels(
        &self,
        repo: &RepoRef,
        number: u64,
        labels: &[String],
    ) -> Result<(), TrackerError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .add_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn add_assignees(
        &self,
        repo: &RepoRef,
        number: u64,
        assignees: &[String],
    ) -> Result<(), TrackerError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let logins: Vec<&str> = assignees.iter().map(String::as_str).collect();
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .add_assignees(number, &logins)
            .await?;
        Ok(())
    }

    async fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<(), TrackerError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .create_label(&label.name, &label.color, &label.description)
            .await?;
        Ok(())
    }

    async fn add_project_item(
        &self,
        project: &Project,
        repo: &RepoRef,
        issue: &Issue,
    ) -> Result<ProjectItem, TrackerError> {
        let data: AddItemData = self
            .graphql(
                graphql::ADD_ITEM,
                json!({ "projectId": project.id, "contentId": issue.node_id }),
            )
            .await?;
        let item = data
            .add_project_v2_item_by_id
            .item
            .ok_or_else(|| TrackerError::GraphQl {
                message: format!("no item returned for issue #{}", issue.number),
            })?;

        Ok(ProjectItem {
            id: item.id,
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
        let value = match value {
            FieldValue::SingleSelect(name) => {
                let option = field.option(name).ok_or_else(|| {
                    TrackerError::not_found(format!("option '{name}' of field '{}'", field.name))
                })?;
                json!({ "singleSelectOptionId": option.id })
            }
            FieldValue::Number(number) => json!({ "number": number }),
            FieldValue::Text(text) => json!({ "text": text }),
        };

        let _: Value = self
            .graphql(
                graphql::UPDATE_FIELD_VALUE,
                json!({
                    "projectId": project.id,
                    "itemId": item_id,
                    "fieldId": field.id,
                    "value": value,
                }),
            )
            .await?;
        Ok(())
    }
}
