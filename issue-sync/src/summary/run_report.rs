//! The externally visible report of a run.

use serde::Serialize;
use std::fmt;

/// Report of one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub name: String,
    pub success: bool,
    pub duration_secs: f64,
    pub entity_failures: usize,
    pub error: Option<String>,

    /// Last captured output lines.
    pub output: Vec<String>,
}

/// Report of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Whether writes were only logged.
    pub dry_run: bool,

    pub total_duration_secs: f64,

    /// Percentage of successful stages.
    pub success_rate: f64,

    pub stages: Vec<StageReport>,
}

impl RunReport {
    /// Returns true if any stage failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.stages.iter().any(|stage| !stage.success)
    }

    /// Returns true if every stage succeeded.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let succeeded = self.stages.iter().filter(|s| s.success).count();
        writeln!(f, "Summary:")?;
        writeln!(f, "  Mode: {}", if self.dry_run { "Dry Run" } else { "Live" })?;
        writeln!(f, "  Total duration: {:.2}s", self.total_duration_secs)?;
        writeln!(
            f,
            "  Success rate: {:.1}% ({succeeded}/{} stages)",
            self.success_rate,
            self.stages.len()
        )?;

        for stage in &self.stages {
            let status = if stage.success { "ok" } else { "FAILED" };
            write!(f, "\n  [{status}] {} ({:.2}s", stage.name, stage.duration_secs)?;
            if stage.entity_failures > 0 {
                write!(f, ", {} entity failures", stage.entity_failures)?;
            }
            writeln!(f, ")")?;
            if let Some(error) = &stage.error {
                writeln!(f, "    error: {error}")?;
            }
            for line in &stage.output {
                writeln!(f, "    | {line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_render_text_and_json() {
        let report = RunReport {
            dry_run: false,
            total_duration_secs: 1.5,
            success_rate: 50.0,
            stages: vec![
                StageReport {
                    name: "issue-migration".to_string(),
                    success: true,
                    duration_secs: 1.0,
                    entity_failures: 0,
                    error: None,
                    output: vec!["src/api -> dest/api: 2 created, 3 matched".to_string()],
                },
                StageReport {
                    name: "label-sync".to_string(),
                    success: false,
                    duration_secs: 0.5,
                    entity_failures: 1,
                    error: None,
                    output: Vec::new(),
                },
            ],
        };

        let text = report.to_string();
        assert!(text.contains("Success rate: 50.0% (1/2 stages)"));
        assert!(text.contains("[FAILED] label-sync (0.50s, 1 entity failures)"));
        assert!(text.contains("| src/api -> dest/api: 2 created, 3 matched"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stages"][1]["entity_failures"], 1);
        assert!(report.has_failures());
    }
}
