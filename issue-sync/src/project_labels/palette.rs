//! Semantic colors for project option labels.

use serde::Serialize;

/// Semantic color bucket of a project option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBucket {
    Success,
    InFlight,
    Review,
    Testing,
    Pending,
    Default,
}

/// Keywords in priority order. The first one contained in the option name wins.
const KEYWORDS: &[(&str, ColorBucket)] = &[
    ("done", ColorBucket::Success),
    ("complete", ColorBucket::Success),
    ("closed", ColorBucket::Success),
    ("progress", ColorBucket::InFlight),
    ("review", ColorBucket::Review),
    ("test", ColorBucket::Testing),
    ("qa", ColorBucket::Testing),
    ("todo", ColorBucket::Pending),
    ("to do", ColorBucket::Pending),
    ("backlog", ColorBucket::Pending),
];

impl ColorBucket {
    /// Classifies an option name by case-insensitive keyword containment.
    #[must_use]
    pub fn for_option(name: &str) -> Self {
        let name = name.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| name.contains(keyword))
            .map_or(Self::Default, |(_, bucket)| *bucket)
    }

    /// Hex color without the leading `#`.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            Self::Success => "0e8a16",
            Self::InFlight => "fbca04",
            Self::Review => "0052cc",
            Self::Testing => "5319e7",
            Self::Pending => "d73a4a",
            Self::Default => "bfd4f2",
        }
    }
}
