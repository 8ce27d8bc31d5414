//! Sync configuration.
//!
//! [`SyncConfig`] is the single explicit configuration passed to the
//! orchestrator. It can be read from a TOML file with kebab-case keys:
//!
//! ```toml
//! source-org = "acme-legacy"
//! dest-org = "acme"
//! repos = ["api", "web"]
//! project = "Roadmap"
//! column-field = "Status"
//! fields = ["Status", "Estimate"]
//! label-case-insensitive = false
//! output-lines = 3
//! dry-run = false
//! ```
//!
//! Every key has a default so a file may hold only part of the settings;
//! [`SyncConfig::validate`] rejects configurations that cannot run.

mod error;

pub use error::ConfigError;

use crate::labels::DEFAULT_SIZING_PREFIXES;
use crate::model::{RepoPair, RepoRef};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Settings of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Owner of the source repositories and project.
    pub source_org: String,

    /// Owner of the destination repositories and project.
    pub dest_org: String,

    /// Repository names present in both organizations.
    pub repos: Vec<String>,

    /// Projects-V2 title looked up in both organizations.
    pub project: Option<String>,

    /// Single-select field holding an issue's project column.
    pub column_field: String,

    /// Field names to synchronize; empty means every shared field.
    pub fields: Vec<String>,

    /// Name prefixes identifying sizing labels.
    pub sizing_prefixes: Vec<String>,

    /// Whether label identity ignores case.
    pub label_case_insensitive: bool,

    /// Captured output lines kept per stage in the report.
    pub output_lines: usize,

    /// Log writes instead of applying them.
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_org: String::new(),
            dest_org: String::new(),
            repos: Vec::new(),
            project: None,
            column_field: default_column_field(),
            fields: Vec::new(),
            sizing_prefixes: DEFAULT_SIZING_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            label_case_insensitive: false,
            output_lines: default_output_lines(),
            dry_run: false,
        }
    }
}

pub(crate) fn default_column_field() -> String {
    "Status".to_string()
}

pub(crate) fn default_output_lines() -> usize {
    3
}

impl SyncConfig {
    /// Reads a configuration file without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Parses a configuration from TOML; `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] on malformed input or unknown keys.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: origin.to_string(),
            source: e,
        })
    }

    /// Checks that the configuration can drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first problem found.
    pub fn validate(&self, origin: &str) -> Result<(), ConfigError> {
        let fail = |message: &str| {
            Err(ConfigError::ValidationError {
                path: origin.to_string(),
                message: message.to_string(),
            })
        };

        if self.source_org.trim().is_empty() {
            return fail("source-org is required");
        }
        if self.dest_org.trim().is_empty() {
            return fail("dest-org is required");
        }
        if self.repos.is_empty() {
            return fail("repos must name at least one repository");
        }
        if self.repos.iter().any(|repo| repo.trim().is_empty()) {
            return fail("repos contains a blank name");
        }
        if self.project.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return fail("project must not be blank");
        }
        if self.column_field.trim().is_empty() {
            return fail("column-field must not be blank");
        }
        if self.output_lines == 0 {
            return fail("output-lines must be at least 1");
        }
        Ok(())
    }

    /// Returns the source/destination repository pairs in configured order.
    #[must_use]
    pub fn repo_pairs(&self) -> Vec<RepoPair> {
        self.repos
            .iter()
            .map(|name| {
                let name = name.trim();
                RepoPair {
                    source: RepoRef::new(self.source_org.trim(), name),
                    dest: RepoRef::new(self.dest_org.trim(), name),
                }
            })
            .collect()
    }
}
