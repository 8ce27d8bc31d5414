//! Issue records.

use serde::Serialize;

/// Open/closed state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Returns the state as a lowercase string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// An issue as listed by the remote tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Issue number within its repository.
    pub number: u64,

    /// Global node id, used when adding the issue to a project.
    pub node_id: String,

    /// Issue title. Its normalized form is the cross-repository identity.
    pub title: String,

    /// Issue body, if any.
    pub body: Option<String>,

    /// Open/closed state.
    pub state: IssueState,

    /// Assignee logins in listing order.
    pub assignees: Vec<String>,

    /// Label names.
    pub labels: Vec<String>,

    /// Project column the issue sits in, when known.
    pub project_column: Option<String>,
}

impl Issue {
    /// Returns true if the issue is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }
}

/// Payload for creating a destination issue from a source issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: Option<String>,
    pub assignees: Vec<String>,
    pub state: IssueState,
}

impl From<&Issue> for NewIssue {
    fn from(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            body: issue.body.clone(),
            assignees: issue.assignees.clone(),
            state: issue.state,
        }
    }
}
