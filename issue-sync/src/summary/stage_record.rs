//! Per-stage records.

use super::EntityFailure;
use crate::stages::Stage;
use std::time::Duration;

/// Outcome of one stage. Not modified after the stage completes.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    /// Stage that produced this record.
    pub stage: Stage,

    /// Wall-clock time the stage took.
    pub duration: Duration,

    /// Captured output lines, oldest first.
    pub output: Vec<String>,

    /// Entities that failed while the stage kept going.
    pub failures: Vec<EntityFailure>,

    /// Stage-level error, if the stage could not run to completion.
    pub error: Option<String>,
}

impl StageRecord {
    /// Returns true if the stage raised no error and no entity failed.
    #[must_use]
    pub fn success(&self) -> bool {
        self.error.is_none() && self.failures.is_empty()
    }

    /// Returns the last `n` output lines.
    #[must_use]
    pub fn last_lines(&self, n: usize) -> &[String] {
        &self.output[self.output.len().saturating_sub(n)..]
    }
}
