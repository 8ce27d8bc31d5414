//! Additive assignee reconciliation.

use crate::model::Issue;

/// Returns the source assignees missing on the destination, in source order.
///
/// Assignees present only on the destination are never part of the delta.
#[must_use]
pub fn assignee_delta(source: &Issue, dest: &Issue) -> Vec<String> {
    let mut delta: Vec<String> = Vec::new();
    for login in &source.assignees {
        if !dest.assignees.contains(login) && !delta.contains(login) {
            delta.push(login.clone());
        }
    }
    delta
}
