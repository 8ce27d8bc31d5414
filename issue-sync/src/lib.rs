#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod assignees;
pub mod config;
pub mod labels;
pub mod matching;
pub mod model;
pub mod project_fields;
pub mod project_labels;
pub mod runner;
pub mod stages;
pub mod summary;
pub mod tracker;

pub use assignees::assignee_delta;
pub use config::{ConfigError, SyncConfig};
pub use labels::{project_label_name, LabelDeltaComputer, SizingLabels};
pub use matching::{normalize_title, EntityMatcher, IssueMatch, MatchTarget, TitleCollision};
pub use project_fields::{FieldSkip, FieldSyncReport, ProjectItemFieldSync, ProjectPair};
pub use project_labels::{ensure_labels_for_options, ColorBucket, OptionLabelReport};
pub use runner::{Orchestrator, Runner, RunnerConfig, RunnerError};
pub use stages::{Stage, StageError};
pub use summary::{EntityFailure, ExecutionResult, RunReport, StageRecord, StageReport};
pub use tracker::{
    DryRunTracker, GitHubTracker, InMemoryTracker, InjectedFailure, IssueTracker, TrackerError,
};
