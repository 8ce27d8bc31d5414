//! Cross-repository issue matching by normalized title.
//!
//! Source and destination issues share no identifier, so a destination issue
//! corresponds to a source issue when their normalized titles are equal.
//! Everything here is pure; creating the missing issues is up to the caller.

mod issue_match;

pub use issue_match::{IssueMatch, MatchTarget, TitleCollision};

use crate::model::{Issue, NewIssue};
use std::collections::{HashMap, HashSet};

/// Folds case and collapses whitespace so cosmetic title edits still match.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Index of destination issues keyed by normalized title.
#[derive(Debug)]
pub struct EntityMatcher<'a> {
    index: HashMap<String, &'a Issue>,
    collisions: Vec<TitleCollision>,
}

impl<'a> EntityMatcher<'a> {
    /// Indexes destination issues in listing order. The first issue with a
    /// given normalized title wins; later ones are recorded as collisions.
    #[must_use]
    pub fn new(dest: &'a [Issue]) -> Self {
        let mut index: HashMap<String, &'a Issue> = HashMap::new();
        let mut collisions: Vec<TitleCollision> = Vec::new();

        for issue in dest {
            let key = normalize_title(&issue.title);
            match index.get(&key) {
                Some(kept) => {
                    if let Some(existing) = collisions.iter_mut().find(|c| c.normalized == key) {
                        existing.ignored.push(issue.number);
                    } else {
                        collisions.push(TitleCollision {
                            normalized: key,
                            kept: kept.number,
                            ignored: vec![issue.number],
                        });
                    }
                }
                None => {
                    index.insert(key, issue);
                }
            }
        }

        Self { index, collisions }
    }

    /// Destination titles shared by more than one issue.
    #[must_use]
    pub fn collisions(&self) -> &[TitleCollision] {
        &self.collisions
    }

    /// Looks up the destination issue for a title.
    #[must_use]
    pub fn find(&self, title: &str) -> Option<&'a Issue> {
        self.index.get(&normalize_title(title)).copied()
    }

    /// Pairs every source issue, in order, with its destination or a create payload.
    ///
    /// Only the first source issue of a normalized title yields a create
    /// payload; repeats are [`MatchTarget::AlreadyScheduled`].
    #[must_use]
    pub fn match_issues<'s>(&self, source: &'s [Issue]) -> Vec<IssueMatch<'s, 'a>> {
        let mut scheduled = HashSet::new();
        source
            .iter()
            .map(|issue| {
                let target = match self.find(&issue.title) {
                    Some(dest) => MatchTarget::Existing(dest),
                    None if scheduled.insert(normalize_title(&issue.title)) => {
                        MatchTarget::Create(NewIssue::from(issue))
                    }
                    None => MatchTarget::AlreadyScheduled,
                };
                IssueMatch {
                    source: issue,
                    target,
                }
            })
            .collect()
    }
}
