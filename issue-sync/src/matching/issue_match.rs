//! Matching results.

use crate::model::{Issue, NewIssue};

/// What a source issue maps to on the destination.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchTarget<'d> {
    /// A destination issue with the same normalized title exists.
    Existing(&'d Issue),

    /// No destination issue exists; this payload creates one.
    Create(NewIssue),

    /// An earlier source issue with the same normalized title already
    /// carries the create payload.
    AlreadyScheduled,
}

/// A source issue paired with its destination counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueMatch<'s, 'd> {
    pub source: &'s Issue,
    pub target: MatchTarget<'d>,
}

/// Several destination issues sharing one normalized title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCollision {
    /// The shared normalized title.
    pub normalized: String,

    /// Issue number used for matching.
    pub kept: u64,

    /// Later issues ignored for matching, in listing order.
    pub ignored: Vec<u64>,
}
