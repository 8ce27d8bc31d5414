//! Accumulated stage records of one run.

use super::{RunReport, StageRecord, StageReport};
use std::time::Duration;

/// Ordered stage records, appended once per completed stage.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    records: Vec<StageRecord>,
    dry_run: bool,
}

impl ExecutionResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            records: Vec::new(),
            dry_run,
        }
    }

    /// Appends the record of a completed stage.
    pub fn record(&mut self, record: StageRecord) {
        self.records.push(record);
    }

    /// Returns the records in execution order.
    #[must_use]
    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    /// Returns true if any stage failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.records.iter().any(|record| !record.success())
    }

    /// Returns true if every stage succeeded.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }

    /// Percentage of successful stages; 0 when no stage ran.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let succeeded = self.records.iter().filter(|r| r.success()).count();
        succeeded as f64 * 100.0 / self.records.len() as f64
    }

    /// Consumes the result into a report keeping `output_lines` lines per stage.
    #[must_use]
    pub fn into_report(self, total: Duration, output_lines: usize) -> RunReport {
        let success_rate = self.success_rate();
        let stages = self
            .records
            .iter()
            .map(|record| StageReport {
                name: record.stage.name().to_string(),
                success: record.success(),
                duration_secs: record.duration.as_secs_f64(),
                entity_failures: record.failures.len(),
                error: record.error.clone(),
                output: record.last_lines(output_lines).to_vec(),
            })
            .collect();

        RunReport {
            dry_run: self.dry_run,
            total_duration_secs: total.as_secs_f64(),
            success_rate,
            stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::Stage;
    use crate::summary::EntityFailure;

    fn record(stage: Stage, failures: usize, error: Option<&str>) -> StageRecord {
        StageRecord {
            stage,
            duration: Duration::from_millis(250),
            output: (1..=5).map(|i| format!("line {i}")).collect(),
            failures: (0..failures)
                .map(|i| EntityFailure::new(format!("dest/api#{i}"), &"Not found"))
                .collect(),
            error: error.map(ToString::to_string),
        }
    }

    #[test]
    fn empty_run_has_zero_success_rate() {
        assert_eq!(ExecutionResult::new(false).success_rate(), 0.0);
    }

    #[test]
    fn entity_failure_fails_stage() {
        let mut result = ExecutionResult::new(false);
        result.record(record(Stage::IssueMigration, 0, None));
        result.record(record(Stage::LabelSync, 1, None));
        result.record(record(Stage::ProjectLabelCreation, 0, Some("project not found")));
        result.record(record(Stage::ProjectFieldSync, 0, None));

        assert!(result.has_failures());
        assert_eq!(result.success_rate(), 50.0);
    }

    #[test]
    fn can_build_report_with_last_lines() {
        let mut result = ExecutionResult::new(true);
        result.record(record(Stage::IssueMigration, 0, None));

        let report = result.into_report(Duration::from_secs(2), 3);

        assert!(report.dry_run);
        assert_eq!(report.total_duration_secs, 2.0);
        assert_eq!(report.success_rate, 100.0);
        assert_eq!(report.stages[0].name, "issue-migration");
        assert_eq!(report.stages[0].output, vec!["line 3", "line 4", "line 5"]);
    }
}
