//! Projects-V2 GraphQL documents and response shapes.

use crate::model::{
    Field, FieldKind, FieldOption, FieldValue, ItemContent, Project, ProjectItem, ProjectScope,
};
use crate::tracker::TrackerError;
use serde::Deserialize;
use std::collections::BTreeMap;

pub(super) const ORGANIZATION_PROJECTS: &str = r#"
query($login:String!, $after:String) {
  organization(login:$login) {
    projectsV2(first:50, after:$after) {
      nodes { id title number }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;

pub(super) const USER_PROJECTS: &str = r#"
query($login:String!, $after:String) {
  user(login:$login) {
    projectsV2(first:50, after:$after) {
      nodes { id title number }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;

pub(super) const PROJECT_FIELDS: &str = r#"
query($id:ID!, $after:String) {
  node(id:$id) {
    ... on ProjectV2 {
      fields(first:50, after:$after) {
        nodes {
          __typename
          ... on ProjectV2SingleSelectField { id name dataType options { id name color } }
          ... on ProjectV2Field { id name dataType }
        }
        pageInfo { hasNextPage endCursor }
      }
    }
  }
}
"#;

pub(super) const PROJECT_ITEMS: &str = r#"
query($id:ID!, $after:String) {
  node(id:$id) {
    ... on ProjectV2 {
      items(first:100, after:$after) {
        nodes {
          id
          content { __typename ... on Issue { id number title repository { name } } }
          fieldValues(first:50) {
            nodes {
              __typename
              ... on ProjectV2ItemFieldSingleSelectValue { name field { ... on ProjectV2FieldCommon { name } } }
              ... on ProjectV2ItemFieldTextValue { text field { ... on ProjectV2FieldCommon { name } } }
              ... on ProjectV2ItemFieldNumberValue { number field { ... on ProjectV2FieldCommon { name } } }
            }
          }
        }
        pageInfo { hasNextPage endCursor }
      }
    }
  }
}
"#;

pub(super) const ADD_ITEM: &str = r#"
mutation($projectId:ID!, $contentId:ID!) {
  addProjectV2ItemById(input:{projectId:$projectId, contentId:$contentId}) {
    item { id }
  }
}
"#;

pub(super) const UPDATE_FIELD_VALUE: &str = r#"
mutation($projectId:ID!, $itemId:ID!, $fieldId:ID!, $value:ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(input:{projectId:$projectId, itemId:$itemId, fieldId:$fieldId, value:$value}) {
    projectV2Item { id }
  }
}
"#;

/// GraphQL envelope.
#[derive(Debug, Deserialize)]
pub(super) struct Response<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl<T> Response<T> {
    /// Converts the envelope into data or a classified error.
    pub(super) fn into_result(self) -> Result<T, TrackerError> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(match self.errors[0].kind.as_deref() {
                Some("NOT_FOUND") => TrackerError::NotFound { what: message },
                Some("RATE_LIMITED") => TrackerError::RateLimited { message },
                _ => TrackerError::GraphQl { message },
            });
        }
        self.data.ok_or_else(|| TrackerError::GraphQl {
            message: "response carried no data".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Connection<N> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Option<N>>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwnerData {
    #[serde(alias = "organization", alias = "user")]
    pub owner: Option<OwnerProjects>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwnerProjects {
    #[serde(rename = "projectsV2")]
    pub projects: Connection<ProjectNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProjectNode {
    pub id: String,
    pub title: String,
    pub number: u64,
}

impl ProjectNode {
    pub(super) fn into_project(self, scope: ProjectScope, fields: Vec<Field>) -> Project {
        Project {
            id: self.id,
            number: self.number,
            title: self.title,
            scope,
            fields,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct NodeData<T> {
    pub node: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProjectFields {
    pub fields: Connection<RawField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawField {
    id: Option<String>,
    name: Option<String>,
    data_type: Option<String>,
    options: Option<Vec<RawOption>>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    id: String,
    name: String,
    color: Option<String>,
}

impl RawField {
    /// Converts to a [`Field`]; kinds other than single-select, number and text yield `None`.
    pub(super) fn into_field(self) -> Option<Field> {
        let kind = match self.data_type.as_deref()? {
            "SINGLE_SELECT" => FieldKind::SingleSelect {
                options: self
                    .options
                    .unwrap_or_default()
                    .into_iter()
                    .map(|o| FieldOption {
                        id: o.id,
                        name: o.name,
                        color: o.color,
                    })
                    .collect(),
            },
            "NUMBER" => FieldKind::Number,
            "TEXT" => FieldKind::Text,
            _ => return None,
        };
        Some(Field {
            id: self.id?,
            name: self.name?,
            kind,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProjectItems {
    pub items: Connection<RawItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawItem {
    id: String,
    content: Option<RawContent>,
    field_values: Option<RawValues>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(rename = "__typename")]
    typename: String,
    id: Option<String>,
    number: Option<u64>,
    title: Option<String>,
    repository: Option<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawValues {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<RawValue>>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(rename = "__typename")]
    typename: String,
    name: Option<String>,
    text: Option<String>,
    number: Option<f64>,
    field: Option<RawFieldRef>,
}

#[derive(Debug, Deserialize)]
struct RawFieldRef {
    name: Option<String>,
}

impl RawItem {
    /// Converts to a [`ProjectItem`], keeping only values of fields in `schema`.
    pub(super) fn into_item(self, schema: &[Field]) -> ProjectItem {
        let content = self.content.and_then(|content| {
            if content.typename != "Issue" {
                return None;
            }
            Some(ItemContent {
                issue_node_id: content.id?,
                number: content.number?,
                title: content.title?,
                repository: content.repository?.name,
            })
        });

        let mut values = BTreeMap::new();
        let nodes = self.field_values.map(|v| v.nodes).unwrap_or_default();
        for raw in nodes.into_iter().flatten() {
            let Some(field_name) = raw.field.and_then(|f| f.name) else {
                continue;
            };
            if !schema.iter().any(|field| field.name == field_name) {
                continue;
            }
            let value = match raw.typename.as_str() {
                "ProjectV2ItemFieldSingleSelectValue" => raw.name.map(FieldValue::SingleSelect),
                "ProjectV2ItemFieldTextValue" => raw.text.map(FieldValue::Text),
                "ProjectV2ItemFieldNumberValue" => raw.number.map(FieldValue::Number),
                _ => None,
            };
            if let Some(value) = value {
                values.insert(field_name, value);
            }
        }

        ProjectItem {
            id: self.id,
            content,
            values,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddItemData {
    pub add_project_v2_item_by_id: AddItemPayload,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddItemPayload {
    pub item: Option<ItemId>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ItemId {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn can_convert_item_with_values() {
        let schema = vec![Field {
            id: "F1".to_string(),
            name: "Status".to_string(),
            kind: FieldKind::SingleSelect { options: vec![] },
        }];
        let raw: RawItem = serde_json::from_value(json!({
            "id": "PVTI_1",
            "content": {
                "__typename": "Issue",
                "id": "I_1",
                "number": 7,
                "title": "Fix login bug",
                "repository": { "name": "api" }
            },
            "fieldValues": { "nodes": [
                { "__typename": "ProjectV2ItemFieldSingleSelectValue", "name": "Done", "field": { "name": "Status" } },
                { "__typename": "ProjectV2ItemFieldTextValue", "text": "Fix login bug", "field": { "name": "Title" } },
                { "__typename": "ProjectV2ItemFieldDateValue", "field": { "name": "Due" } }
            ]}
        }))
        .unwrap();

        let item = raw.into_item(&schema);

        assert_eq!(item.content.as_ref().map(|c| c.number), Some(7));
        assert_eq!(item.values.len(), 1);
        assert_eq!(
            item.values.get("Status"),
            Some(&FieldValue::SingleSelect("Done".to_string()))
        );
    }

    #[test]
    fn draft_items_have_no_content() {
        let raw: RawItem = serde_json::from_value(json!({
            "id": "PVTI_2",
            "content": { "__typename": "DraftIssue" },
            "fieldValues": { "nodes": [] }
        }))
        .unwrap();

        assert!(raw.into_item(&[]).content.is_none());
    }

    #[test]
    fn unsupported_field_kinds_are_dropped() {
        let raw: RawField = serde_json::from_value(json!({
            "id": "F9", "name": "Iteration", "dataType": "ITERATION"
        }))
        .unwrap();
        assert!(raw.into_field().is_none());

        let raw: RawField = serde_json::from_value(json!({
            "id": "F2", "name": "Estimate", "dataType": "NUMBER"
        }))
        .unwrap();
        assert_eq!(raw.into_field().map(|f| f.kind), Some(FieldKind::Number));
    }

    #[test]
    fn not_found_errors_are_classified() {
        let response: Response<OwnerData> = serde_json::from_value(json!({
            "data": { "organization": null },
            "errors": [{ "type": "NOT_FOUND", "message": "Could not resolve to an Organization" }]
        }))
        .unwrap();

        assert!(matches!(
            response.into_result(),
            Err(TrackerError::NotFound { .. })
        ));
    }
}
