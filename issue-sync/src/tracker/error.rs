//! Tracker error types.

use thiserror::Error;

/// Errors raised by an [`IssueTracker`](super::IssueTracker).
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Referenced repository, project, field, option or issue does not exist.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// The remote API refused the call because of rate limiting.
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// The entity being created already exists.
    #[error("Already exists: {what}")]
    AlreadyExists { what: String },

    /// The remote API rejected the request's content (HTTP 422).
    #[error("Validation failed: {message}")]
    Invalid { message: String },

    /// GraphQL-level error returned alongside an HTTP 200.
    #[error("GraphQL error: {message}")]
    GraphQl { message: String },

    /// Any other GitHub API error.
    #[error("GitHub API error: {0}")]
    Api(#[source] octocrab::Error),
}

impl TrackerError {
    /// Creates a [`TrackerError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns true for [`TrackerError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`TrackerError::AlreadyExists`].
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns true for [`TrackerError::Invalid`].
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// Maps an HTTP error response onto a specific variant.
    ///
    /// Returns `None` when the response should be kept as [`TrackerError::Api`].
    fn classify(status: u16, message: &str, errors: &[serde_json::Value]) -> Option<Self> {
        let lowered = message.to_lowercase();
        let already_exists = errors
            .iter()
            .any(|e| e.get("code").and_then(|code| code.as_str()) == Some("already_exists"));

        match status {
            404 => Some(Self::not_found(message)),
            403 | 429 if lowered.contains("rate limit") => Some(Self::RateLimited {
                message: message.to_string(),
            }),
            422 if already_exists || lowered.contains("already_exists") => {
                Some(Self::AlreadyExists {
                    what: message.to_string(),
                })
            }
            422 => Some(Self::Invalid {
                message: message.to_string(),
            }),
            _ => None,
        }
    }
}

impl From<octocrab::Error> for TrackerError {
    fn from(error: octocrab::Error) -> Self {
        if let octocrab::Error::GitHub { source, .. } = &error {
            let errors = source.errors.as_deref().unwrap_or_default();
            if let Some(classified) =
                Self::classify(source.status_code.as_u16(), &source.message, errors)
            {
                return classified;
            }
        }
        Self::Api(error)
    }
}
