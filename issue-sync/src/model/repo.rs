//! Resolved repository handles.

use serde::Serialize;
use std::fmt;

/// A repository addressed by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// Creates a new repository handle.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A source repository and the destination it migrates into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPair {
    /// Repository issues are read from.
    pub source: RepoRef,

    /// Repository issues are written to.
    pub dest: RepoRef,
}
