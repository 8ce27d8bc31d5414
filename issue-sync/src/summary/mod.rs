//! Execution results and the run report.

mod entity_failure;
mod execution_result;
mod run_report;
mod stage_record;

pub use entity_failure::EntityFailure;
pub use execution_result::ExecutionResult;
pub use run_report::{RunReport, StageReport};
pub use stage_record::StageRecord;
