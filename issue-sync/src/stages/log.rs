//! Captured stage output.

use crate::stages::Stage;
use crate::summary::{EntityFailure, StageRecord};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Output lines and entity failures collected while a stage runs.
#[derive(Debug, Default)]
pub struct StageLog {
    output: Vec<String>,
    failures: Vec<EntityFailure>,
}

impl StageLog {
    /// Captures a human-readable output line.
    pub fn line(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    /// Records a failed entity; the stage keeps going.
    pub fn failure(&mut self, entity: impl Into<String>, error: &dyn fmt::Display) {
        let failure = EntityFailure::new(entity, error);
        warn!(entity = %failure.entity, error = %failure.error, "Entity failed");
        self.failures.push(failure);
    }

    /// Appends failures collected elsewhere.
    pub fn extend_failures(&mut self, failures: impl IntoIterator<Item = EntityFailure>) {
        for failure in failures {
            warn!(entity = %failure.entity, error = %failure.error, "Entity failed");
            self.failures.push(failure);
        }
    }

    /// Returns the captured lines.
    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Returns the recorded failures.
    #[must_use]
    pub fn failures(&self) -> &[EntityFailure] {
        &self.failures
    }

    /// Freezes the log into the record of a finished stage.
    #[must_use]
    pub fn into_record(
        self,
        stage: Stage,
        duration: Duration,
        error: Option<String>,
    ) -> StageRecord {
        StageRecord {
            stage,
            duration,
            output: self.output,
            failures: self.failures,
            error,
        }
    }
}
