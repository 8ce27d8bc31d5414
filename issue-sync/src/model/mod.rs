//! Core data model shared by every reconciliation pass.
//!
//! Source and destination entities use the same types; they are linked only
//! through derived keys (normalized titles, label names, field names), never
//! through a shared identifier.

mod issue;
mod label;
mod project;
mod repo;

pub use issue::{Issue, IssueState, NewIssue};
pub use label::Label;
pub(crate) use project::names_match;
pub use project::{
    Field, FieldKind, FieldOption, FieldValue, ItemContent, Project, ProjectItem, ProjectScope,
};
pub use repo::{RepoPair, RepoRef};
