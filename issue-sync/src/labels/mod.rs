//! Label delta computation.
//!
//! The delta for a matched issue pair is additive: source labels the
//! destination catalog knows about, sizing labels regardless of the catalog,
//! and the synthesized project-column label, minus what the destination
//! issue already carries.

mod sizing;

pub use sizing::{SizingLabels, DEFAULT_SIZING_PREFIXES};

use crate::model::{Issue, Label};

/// Prefix of labels that mirror project column / option membership.
pub const PROJECT_LABEL_PREFIX: &str = "Project: ";

/// Returns the label name representing a project column or option.
#[must_use]
pub fn project_label_name(option: &str) -> String {
    format!("{PROJECT_LABEL_PREFIX}{}", option.trim())
}

/// Computes the labels to add to a destination issue.
#[derive(Debug, Clone, Default)]
pub struct LabelDeltaComputer {
    sizing: SizingLabels,
    case_insensitive: bool,
}

impl LabelDeltaComputer {
    /// Creates a computer with the given sizing matcher and case policy.
    #[must_use]
    pub fn new(sizing: SizingLabels, case_insensitive: bool) -> Self {
        Self {
            sizing,
            case_insensitive,
        }
    }

    fn same(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive {
            a.to_lowercase() == b.to_lowercase()
        } else {
            a == b
        }
    }

    /// Returns the labels missing on `dest`, in source order, project label last.
    ///
    /// Never contains a label `dest` already has.
    #[must_use]
    pub fn delta(&self, source: &Issue, catalog: &[Label], dest: &Issue) -> Vec<String> {
        let mut candidates: Vec<String> = source
            .labels
            .iter()
            .filter(|name| {
                self.sizing.is_sizing(name) || catalog.iter().any(|l| self.same(&l.name, name))
            })
            .cloned()
            .collect();

        if let Some(column) = &source.project_column {
            candidates.push(project_label_name(column));
        }

        let mut delta: Vec<String> = Vec::new();
        for name in candidates {
            let on_dest = dest.labels.iter().any(|l| self.same(l, &name));
            let seen = delta.iter().any(|l| self.same(l, &name));
            if !on_dest && !seen {
                delta.push(name);
            }
        }
        delta
    }
}
