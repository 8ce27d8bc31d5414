//! Project item field synchronization.
//!
//! Makes a destination issue an item of the destination project and copies
//! the source item's field values onto it. Fields are matched by name,
//! single-select values by option name. Only differing values are written.

mod skip;

pub use skip::FieldSkip;

use crate::model::{names_match, Field, FieldValue, Issue, Project, ProjectItem, RepoRef};
use crate::tracker::{IssueTracker, TrackerError};
use tracing::{debug, info};

/// Source and destination project of a synchronization.
#[derive(Debug, Clone, Copy)]
pub struct ProjectPair<'a> {
    pub source: &'a Project,
    pub dest: &'a Project,
}

/// A field write computed by [`ProjectItemFieldSync::plan`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    /// Destination field to write.
    pub field: Field,

    /// Value to write, using destination option names.
    pub value: FieldValue,
}

/// Writes and skips for one item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPlan {
    pub updates: Vec<FieldUpdate>,
    pub skipped: Vec<FieldSkip>,
}

/// Outcome of synchronizing one item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSyncReport {
    /// True if the issue had to be added to the project.
    pub item_added: bool,

    /// Names of the fields written.
    pub updated: Vec<String>,

    /// Fields left untouched on purpose.
    pub skipped: Vec<FieldSkip>,
}

/// Copies field values from source project items to destination items.
#[derive(Debug, Clone, Default)]
pub struct ProjectItemFieldSync {
    allow: Vec<String>,
}

impl ProjectItemFieldSync {
    /// Creates a synchronizer. An empty allow-list means every shared field.
    #[must_use]
    pub fn new(allow: Vec<String>) -> Self {
        Self { allow }
    }

    fn allowed(&self, name: &str) -> bool {
        self.allow.is_empty() || self.allow.iter().any(|a| names_match(a, name))
    }

    /// Computes the writes that bring `dest_item` in line with `source_item`.
    ///
    /// Source fields without a value are ignored; destination values are
    /// never cleared.
    #[must_use]
    pub fn plan(
        &self,
        projects: ProjectPair<'_>,
        source_item: &ProjectItem,
        dest_item: Option<&ProjectItem>,
    ) -> FieldPlan {
        let mut plan = FieldPlan::default();

        for source_field in &projects.source.fields {
            if !self.allowed(&source_field.name) {
                continue;
            }
            let Some(desired) = source_item.value(&source_field.name) else {
                continue;
            };
            let Some(dest_field) = projects.dest.field(&source_field.name) else {
                plan.skipped.push(FieldSkip::MissingField {
                    field: source_field.name.clone(),
                });
                continue;
            };
            if !desired.fits(&dest_field.kind) {
                plan.skipped.push(FieldSkip::KindMismatch {
                    field: dest_field.name.clone(),
                    expected: dest_field.kind.as_str(),
                    found: desired.kind_str(),
                });
                continue;
            }

            let desired = match desired {
                FieldValue::SingleSelect(name) => match dest_field.option(name) {
                    Some(option) => FieldValue::SingleSelect(option.name.clone()),
                    None => {
                        plan.skipped.push(FieldSkip::UnmappedOption {
                            field: dest_field.name.clone(),
                            option: name.clone(),
                        });
                        continue;
                    }
                },
                other => other.clone(),
            };

            let current = dest_item.and_then(|item| item.value(&dest_field.name));
            if current.is_some_and(|current| values_equal(current, &desired)) {
                continue;
            }
            plan.updates.push(FieldUpdate {
                field: dest_field.clone(),
                value: desired,
            });
        }

        plan
    }

    /// Ensures `dest_issue` is an item of the destination project and applies
    /// [`Self::plan`].
    ///
    /// `dest_items` is the current item listing of the destination project; an
    /// item added here is appended to it so later calls see it.
    ///
    /// # Errors
    ///
    /// Returns the first tracker error; writes already applied stay applied.
    pub async fn sync<T: IssueTracker + ?Sized>(
        &self,
        tracker: &T,
        projects: ProjectPair<'_>,
        source_item: &ProjectItem,
        dest_repo: &RepoRef,
        dest_issue: &Issue,
        dest_items: &mut Vec<ProjectItem>,
    ) -> Result<FieldSyncReport, TrackerError> {
        let mut report = FieldSyncReport::default();

        let position = dest_items.iter().position(|item| {
            item.content
                .as_ref()
                .is_some_and(|c| c.issue_node_id == dest_issue.node_id)
        });
        let position = match position {
            Some(position) => position,
            None => {
                let item = tracker
                    .add_project_item(projects.dest, dest_repo, dest_issue)
                    .await?;
                info!(
                    repo = %dest_repo,
                    number = dest_issue.number,
                    item = %item.id,
                    "Added issue to project"
                );
                report.item_added = true;
                dest_items.push(item);
                dest_items.len() - 1
            }
        };

        let plan = self.plan(projects, source_item, Some(&dest_items[position]));
        report.skipped = plan.skipped;

        for update in plan.updates {
            let item = &mut dest_items[position];
            tracker
                .set_field_value(projects.dest, &item.id, &update.field, &update.value)
                .await?;
            debug!(
                item = %item.id,
                field = %update.field.name,
                value = %update.value,
                "Set field value"
            );
            item.values.insert(update.field.name.clone(), update.value);
            report.updated.push(update.field.name);
        }

        Ok(report)
    }
}

/// Type-specific equality: option names ignore case, numbers and text are exact.
fn values_equal(current: &FieldValue, desired: &FieldValue) -> bool {
    match (current, desired) {
        (FieldValue::SingleSelect(a), FieldValue::SingleSelect(b)) => names_match(a, b),
        (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
        (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldKind, FieldOption, IssueState, ItemContent, ProjectScope};
    use crate::tracker::InMemoryTracker;
    use std::collections::BTreeMap;

    fn status(options: &[&str]) -> Field {
        Field {
            id: "F_status".to_string(),
            name: "Status".to_string(),
            kind: FieldKind::SingleSelect {
                options: options
                    .iter()
                    .map(|name| FieldOption {
                        id: format!("opt_{name}"),
                        name: (*name).to_string(),
                        color: None,
                    })
                    .collect(),
            },
        }
    }

    fn project(id: &str, owner: &str, fields: Vec<Field>) -> Project {
        Project {
            id: id.to_string(),
            number: 1,
            title: "Roadmap".to_string(),
            scope: ProjectScope::Organization(owner.to_string()),
            fields,
        }
    }

    fn item(id: &str, node: &str, values: &[(&str, FieldValue)]) -> ProjectItem {
        ProjectItem {
            id: id.to_string(),
            content: Some(ItemContent {
                issue_node_id: node.to_string(),
                number: 1,
                title: "Fix login bug".to_string(),
                repository: "api".to_string(),
            }),
            values: values
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn issue(node: &str) -> Issue {
        Issue {
            number: 1,
            node_id: node.to_string(),
            title: "Fix login bug".to_string(),
            body: None,
            state: IssueState::Open,
            assignees: Vec::new(),
            labels: Vec::new(),
            project_column: None,
        }
    }

    fn select(name: &str) -> FieldValue {
        FieldValue::SingleSelect(name.to_string())
    }

    fn pair<'a>(source: &'a Project, dest: &'a Project) -> ProjectPair<'a> {
        ProjectPair { source, dest }
    }

    #[test]
    fn skips_unmapped_option() {
        let source = project("S", "src", vec![status(&["Blocked"])]);
        let dest = project("D", "dst", vec![status(&["Todo", "Done"])]);
        let source_item = item("S1", "I_src", &[("Status", select("Blocked"))]);

        let plan = ProjectItemFieldSync::default().plan(pair(&source, &dest), &source_item, None);

        assert!(plan.updates.is_empty());
        assert_eq!(
            plan.skipped,
            vec![FieldSkip::UnmappedOption {
                field: "Status".to_string(),
                option: "Blocked".to_string()
            }]
        );
    }

    #[test]
    fn compares_with_type_specific_equality() {
        let estimate = Field {
            id: "F_est".to_string(),
            name: "Estimate".to_string(),
            kind: FieldKind::Number,
        };
        let notes = Field {
            id: "F_notes".to_string(),
            name: "Notes".to_string(),
            kind: FieldKind::Text,
        };
        let fields = vec![status(&["Done"]), estimate, notes];
        let source = project("S", "src", fields.clone());
        let dest = project("D", "dst", fields);
        let source_item = item(
            "S1",
            "I_src",
            &[
                ("Status", select("done")),
                ("Estimate", FieldValue::Number(3.0)),
                ("Notes", FieldValue::Text("Needs QA".to_string())),
            ],
        );
        let dest_item = item(
            "D1",
            "I_dst",
            &[
                ("Status", select("Done")),
                ("Estimate", FieldValue::Number(3.0)),
                ("Notes", FieldValue::Text("needs qa".to_string())),
            ],
        );

        let plan = ProjectItemFieldSync::default().plan(
            pair(&source, &dest),
            &source_item,
            Some(&dest_item),
        );

        let updated: Vec<&str> = plan.updates.iter().map(|u| u.field.name.as_str()).collect();
        assert_eq!(updated, vec!["Notes"]);
    }

    #[test]
    fn reports_kind_mismatch_and_missing_field() {
        let source = project(
            "S",
            "src",
            vec![
                Field {
                    id: "F1".to_string(),
                    name: "Priority".to_string(),
                    kind: FieldKind::Text,
                },
                Field {
                    id: "F2".to_string(),
                    name: "Team".to_string(),
                    kind: FieldKind::Text,
                },
            ],
        );
        let priority = Field {
            id: "F3".to_string(),
            name: "priority".to_string(),
            kind: FieldKind::Number,
        };
        let dest = project("D", "dst", vec![status(&["High"]), priority]);
        let source_item = item(
            "S1",
            "I_src",
            &[
                ("Priority", FieldValue::Text("High".to_string())),
                ("Team", FieldValue::Text("Core".to_string())),
            ],
        );

        let plan = ProjectItemFieldSync::default().plan(pair(&source, &dest), &source_item, None);

        assert!(plan.updates.is_empty());
        assert_eq!(plan.skipped.len(), 2);
        assert!(matches!(
            plan.skipped[0],
            FieldSkip::KindMismatch {
                expected: "number",
                found: "text",
                ..
            }
        ));
        assert_eq!(plan.skipped[1].field(), "Team");
    }

    #[test]
    fn allow_list_limits_fields() {
        let fields = vec![
            status(&["Done"]),
            Field {
                id: "F_est".to_string(),
                name: "Estimate".to_string(),
                kind: FieldKind::Number,
            },
        ];
        let source = project("S", "src", fields.clone());
        let dest = project("D", "dst", fields);
        let source_item = item(
            "S1",
            "I_src",
            &[("Status", select("Done")), ("Estimate", FieldValue::Number(5.0))],
        );

        let sync = ProjectItemFieldSync::new(vec!["estimate".to_string()]);
        let plan = sync.plan(pair(&source, &dest), &source_item, None);

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].value, FieldValue::Number(5.0));
    }

    #[tokio::test]
    async fn writes_single_difference_then_nothing() {
        let tracker = InMemoryTracker::new();
        let repo = RepoRef::new("dst", "api");
        let options = ["Todo", "In Progress", "Done"];
        let source = project("S", "src", vec![status(&options)]);
        let dest = project("D", "dst", vec![status(&options)]);
        tracker.insert_project(dest.clone());
        tracker
            .insert_project_item("D", item("D1", "I_dst", &[("Status", select("Todo"))]))
            .unwrap();
        let source_item = item("S1", "I_src", &[("Status", select("Done"))]);
        let sync = ProjectItemFieldSync::default();

        let mut items = tracker.project_items("D");
        let first = sync
            .sync(&tracker, pair(&source, &dest), &source_item, &repo, &issue("I_dst"), &mut items)
            .await
            .unwrap();

        assert!(!first.item_added);
        assert_eq!(first.updated, vec!["Status".to_string()]);
        assert_eq!(tracker.writes().len(), 1);

        let mut items = tracker.project_items("D");
        let second = sync
            .sync(&tracker, pair(&source, &dest), &source_item, &repo, &issue("I_dst"), &mut items)
            .await
            .unwrap();

        assert!(second.updated.is_empty());
        assert_eq!(tracker.writes().len(), 1);
    }

    #[tokio::test]
    async fn adds_missing_item_once() {
        let tracker = InMemoryTracker::new();
        let repo = RepoRef::new("dst", "api");
        let source = project("S", "src", vec![status(&["Done"])]);
        let dest = project("D", "dst", vec![status(&["Done"])]);
        tracker.insert_project(dest.clone());
        let source_item = item("S1", "I_src", &[("Status", select("Done"))]);
        let sync = ProjectItemFieldSync::default();
        let mut items = Vec::new();

        for _ in 0..2 {
            let projects = pair(&source, &dest);
            sync.sync(&tracker, projects, &source_item, &repo, &issue("I_dst"), &mut items)
                .await
                .unwrap();
        }

        assert_eq!(items.len(), 1);
        assert_eq!(tracker.project_items("D").len(), 1);
        assert_eq!(
            tracker.project_items("D")[0].value("status"),
            Some(&select("Done"))
        );
    }
}
