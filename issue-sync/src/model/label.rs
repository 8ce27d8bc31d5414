//! Repository labels.

use serde::Serialize;

/// A label in a repository's label catalog. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    /// Label name.
    pub name: String,

    /// Hex color without the leading `#`.
    pub color: String,

    /// Label description.
    pub description: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            description: description.into(),
        }
    }
}
