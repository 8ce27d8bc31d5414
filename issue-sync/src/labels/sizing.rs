//! Sizing label detection.

/// Name prefixes that mark a label as a sizing label.
pub const DEFAULT_SIZING_PREFIXES: &[&str] = &[
    "size:",
    "tamaño:",
    "story points:",
    "points:",
    "sp:",
    "point:",
    "estimate:",
    "estimación:",
    "estimacion:",
];

/// Recognizes sizing labels by case-insensitive name prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingLabels {
    prefixes: Vec<String>,
}

impl SizingLabels {
    /// Creates a matcher for the given prefixes.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Returns true if `name` starts with one of the prefixes.
    #[must_use]
    pub fn is_sizing(&self, name: &str) -> bool {
        let name = name.trim_start().to_lowercase();
        self.prefixes.iter().any(|prefix| name.starts_with(prefix))
    }
}

impl Default for SizingLabels {
    fn default() -> Self {
        Self::new(DEFAULT_SIZING_PREFIXES)
    }
}
