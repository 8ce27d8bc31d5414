//! Per-entity failure records.

use serde::Serialize;
use std::fmt;

/// A failure scoped to one entity (issue, label, item or repository).
///
/// Recorded at the entity-processing boundary; never aborts the stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityFailure {
    /// Human-readable entity description, e.g. `dest/api#12`.
    pub entity: String,

    /// Error message.
    pub error: String,
}

impl EntityFailure {
    /// Creates a failure from any displayable error.
    pub fn new(entity: impl Into<String>, error: &dyn fmt::Display) -> Self {
        Self {
            entity: entity.into(),
            error: error.to_string(),
        }
    }
}

impl fmt::Display for EntityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entity, self.error)
    }
}
