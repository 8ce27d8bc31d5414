//! Reasons a field is left untouched.

use serde::Serialize;
use std::fmt;

/// A field that was not written, and why. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FieldSkip {
    /// The destination project has no field with this name.
    MissingField { field: String },

    /// The destination field has a different kind than the source value.
    KindMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The destination single-select field lacks the source option.
    UnmappedOption { field: String, option: String },
}

impl FieldSkip {
    /// Name of the skipped field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field }
            | Self::KindMismatch { field, .. }
            | Self::UnmappedOption { field, .. } => field,
        }
    }
}

impl fmt::Display for FieldSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "field '{field}' missing on destination"),
            Self::KindMismatch {
                field,
                expected,
                found,
            } => write!(f, "field '{field}' is {expected} on destination, source value is {found}"),
            Self::UnmappedOption { field, option } => {
                write!(f, "field '{field}' has no option '{option}' on destination")
            }
        }
    }
}
