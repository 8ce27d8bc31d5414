//! Stage-level error types.

use crate::tracker::TrackerError;
use thiserror::Error;

/// A failure that stops one stage. The orchestrator records it and moves on.
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage needs a project but none is configured.
    #[error("No project configured")]
    ProjectNotConfigured,

    /// The configured project does not exist for an owner.
    #[error("Project '{title}' not found for '{owner}'")]
    ProjectNotFound { owner: String, title: String },

    /// A read the whole stage depends on failed.
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),
}
