//! Projects-V2 schema and items.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Owner scope a project was resolved in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "login", rename_all = "snake_case")]
pub enum ProjectScope {
    Organization(String),
    User(String),
}

impl ProjectScope {
    /// Returns the owning login.
    #[must_use]
    pub fn login(&self) -> &str {
        match self {
            Self::Organization(login) | Self::User(login) => login,
        }
    }
}

impl fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization(login) => write!(f, "org:{login}"),
            Self::User(login) => write!(f, "user:{login}"),
        }
    }
}

/// A Projects-V2 board with its field schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    /// Global node id.
    pub id: String,

    /// Project number within its owner.
    pub number: u64,

    /// Project title. Identity within the owner scope.
    pub title: String,

    /// Where the project was found.
    pub scope: ProjectScope,

    /// Fields in schema order. Unsupported field kinds are omitted.
    pub fields: Vec<Field>,
}

impl Project {
    /// Looks up a field by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| names_match(&field.name, name))
    }

    /// Iterates over the single-select fields of the schema.
    pub fn single_select_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|field| matches!(field.kind, FieldKind::SingleSelect { .. }))
    }
}

/// A project field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Global node id.
    pub id: String,

    /// Field name.
    pub name: String,

    /// Field kind, with options for single-select fields.
    pub kind: FieldKind,
}

impl Field {
    /// Finds a single-select option by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&FieldOption> {
        match &self.kind {
            FieldKind::SingleSelect { options } => {
                options.iter().find(|option| names_match(&option.name, name))
            }
            _ => None,
        }
    }
}

/// Supported field kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    SingleSelect { options: Vec<FieldOption> },
    Number,
    Text,
}

impl FieldKind {
    /// Returns the kind as a lowercase string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleSelect { .. } => "single_select",
            Self::Number => "number",
            Self::Text => "text",
        }
    }
}

/// A single-select option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOption {
    /// Option id, local to its field.
    pub id: String,

    /// Option name.
    pub name: String,

    /// Option color as reported by the tracker, if any.
    pub color: Option<String>,
}

/// A field value typed by the field kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Single-select value, carried by option name.
    SingleSelect(String),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Returns the name of the field kind this value belongs to.
    #[must_use]
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::SingleSelect(_) => "single_select",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
        }
    }

    /// Returns true if this value can be written to a field of `kind`.
    #[must_use]
    pub fn fits(&self, kind: &FieldKind) -> bool {
        matches!(
            (self, kind),
            (Self::SingleSelect(_), FieldKind::SingleSelect { .. })
                | (Self::Number(_), FieldKind::Number)
                | (Self::Text(_), FieldKind::Text)
        )
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleSelect(name) | Self::Text(name) => f.write_str(name),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// The issue a project item points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemContent {
    /// Issue node id.
    pub issue_node_id: String,

    /// Issue number.
    pub number: u64,

    /// Issue title.
    pub title: String,

    /// Name of the repository the issue lives in.
    pub repository: String,
}

/// An item of a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectItem {
    /// Item node id.
    pub id: String,

    /// Linked issue; `None` for drafts and pull requests.
    pub content: Option<ItemContent>,

    /// Current values keyed by field name.
    pub values: BTreeMap<String, FieldValue>,
}

impl ProjectItem {
    /// Looks up the value of a field by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn value(&self, field_name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| names_match(name, field_name))
            .map(|(_, value)| value)
    }
}

/// Compares field or option names the way project schemas are matched.
pub(crate) fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_field() -> Field {
        Field {
            id: "F1".to_string(),
            name: "Status".to_string(),
            kind: FieldKind::SingleSelect {
                options: vec![
                    FieldOption {
                        id: "o1".to_string(),
                        name: "Todo".to_string(),
                        color: None,
                    },
                    FieldOption {
                        id: "o2".to_string(),
                        name: "In Progress".to_string(),
                        color: None,
                    },
                ],
            },
        }
    }

    #[test]
    fn can_find_option_ignoring_case() {
        let field = status_field();
        assert_eq!(field.option(" in progress ").map(|o| o.id.as_str()), Some("o2"));
        assert!(field.option("Done").is_none());
    }

    #[test]
    fn value_fits_matching_kind_only() {
        let field = status_field();
        assert!(FieldValue::SingleSelect("Todo".to_string()).fits(&field.kind));
        assert!(!FieldValue::Number(3.0).fits(&field.kind));
        assert!(FieldValue::Number(3.0).fits(&FieldKind::Number));
    }
}
