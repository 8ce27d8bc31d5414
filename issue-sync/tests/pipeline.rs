use std::collections::BTreeMap;

use issue_sync::model::{
    Field, FieldKind, FieldOption, FieldValue, Issue, IssueState, ItemContent, Label, Project,
    ProjectItem, ProjectScope, RepoRef,
};
use issue_sync::tracker::memory::Write;
use issue_sync::{DryRunTracker, InMemoryTracker, InjectedFailure, Orchestrator, Stage, SyncConfig};

const STATUS_OPTIONS: [&str; 3] = ["Todo", "In Progress", "Done"];

fn source_repo() -> RepoRef {
    RepoRef::new("legacy", "api")
}

fn dest_repo() -> RepoRef {
    RepoRef::new("acme", "api")
}

fn issue(repo: &RepoRef, number: u64, title: &str, state: IssueState) -> Issue {
    Issue {
        number,
        node_id: format!("I_{}_{number}", repo.owner),
        title: title.to_string(),
        body: Some(format!("Body of {title}")),
        state,
        assignees: Vec::new(),
        labels: Vec::new(),
        project_column: None,
    }
}

fn project(id: &str, owner: &str) -> Project {
    Project {
        id: id.to_string(),
        number: 1,
        title: "Roadmap".to_string(),
        scope: ProjectScope::Organization(owner.to_string()),
        fields: vec![
            Field {
                id: format!("{id}_status"),
                name: "Status".to_string(),
                kind: FieldKind::SingleSelect {
                    options: STATUS_OPTIONS
                        .iter()
                        .map(|name| FieldOption {
                            id: format!("{id}_{name}"),
                            name: (*name).to_string(),
                            color: None,
                        })
                        .collect(),
                },
            },
            Field {
                id: format!("{id}_estimate"),
                name: "Estimate".to_string(),
                kind: FieldKind::Number,
            },
        ],
    }
}

fn item(id: &str, issue: &Issue, repo: &RepoRef, values: &[(&str, FieldValue)]) -> ProjectItem {
    ProjectItem {
        id: id.to_string(),
        content: Some(ItemContent {
            issue_node_id: issue.node_id.clone(),
            number: issue.number,
            title: issue.title.clone(),
            repository: repo.name.clone(),
        }),
        values: values
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn select(name: &str) -> FieldValue {
    FieldValue::SingleSelect(name.to_string())
}

fn config(project: Option<&str>) -> SyncConfig {
    SyncConfig {
        source_org: "legacy".to_string(),
        dest_org: "acme".to_string(),
        repos: vec!["api".to_string()],
        project: project.map(ToString::to_string),
        ..SyncConfig::default()
    }
}

/// Two source issues, one already migrated, and a project on both sides.
fn seeded() -> InMemoryTracker {
    let tracker = InMemoryTracker::new();
    let (src, dst) = (source_repo(), dest_repo());

    let mut login_bug = issue(&src, 1, "Fix login bug", IssueState::Open);
    login_bug.labels = vec!["bug".to_string(), "Size: M".to_string()];
    login_bug.assignees = vec!["alice".to_string()];

    let mut dark_mode = issue(&src, 2, "Add dark mode", IssueState::Closed);
    dark_mode.labels = vec!["enhancement".to_string()];
    dark_mode.assignees = vec!["bob".to_string(), "carol".to_string()];

    let mut migrated = issue(&dst, 7, "add  Dark Mode", IssueState::Open);
    migrated.assignees = vec!["carol".to_string(), "dave".to_string()];

    tracker.insert_issue(&src, login_bug.clone());
    tracker.insert_issue(&src, dark_mode.clone());
    tracker.insert_issue(&dst, migrated.clone());
    tracker.insert_label(&dst, Label::new("bug", "d73a4a", "Something isn't working"));

    tracker.insert_project(project("PS", "legacy"));
    tracker.insert_project(project("PD", "acme"));
    let in_progress = [
        ("Status", select("In Progress")),
        ("Estimate", FieldValue::Number(3.0)),
    ];
    tracker
        .insert_project_item("PS", item("PS_1", &login_bug, &src, &in_progress))
        .unwrap();
    tracker
        .insert_project_item("PS", item("PS_2", &dark_mode, &src, &[("Status", select("Done"))]))
        .unwrap();
    tracker
        .insert_project_item("PD", item("PD_7", &migrated, &dst, &[("Status", select("Todo"))]))
        .unwrap();

    tracker
}

fn dest_issue(tracker: &InMemoryTracker, title: &str) -> Issue {
    tracker
        .issues(&dest_repo())
        .into_iter()
        .find(|i| i.title.eq_ignore_ascii_case(title))
        .unwrap()
}

#[tokio::test]
async fn full_run_converges_and_second_run_writes_nothing() {
    let tracker = seeded();
    let config = config(Some("Roadmap"));

    let first = Orchestrator::new(&tracker, &config).run().await;
    assert!(first.all_success(), "{:?}", first.records());
    assert!(!tracker.writes().is_empty());

    tracker.clear_writes();
    let second = Orchestrator::new(&tracker, &config).run().await;

    assert!(second.all_success());
    assert_eq!(tracker.writes(), Vec::<Write>::new());
    assert_eq!(tracker.issues(&dest_repo()).len(), 2);
    assert_eq!(tracker.project_items("PD").len(), 2);
}

#[tokio::test]
async fn migrates_issue_state_assignees_and_labels() {
    let tracker = seeded();
    let config = config(Some("Roadmap"));

    Orchestrator::new(&tracker, &config).run().await;

    let login_bug = dest_issue(&tracker, "Fix login bug");
    assert_eq!(login_bug.state, IssueState::Open);
    assert_eq!(login_bug.assignees, vec!["alice".to_string()]);
    assert_eq!(
        login_bug.labels,
        vec![
            "bug".to_string(),
            "Size: M".to_string(),
            "Project: In Progress".to_string()
        ]
    );

    let dark_mode = dest_issue(&tracker, "add  Dark Mode");
    assert_eq!(dark_mode.number, 7);
    assert_eq!(dark_mode.state, IssueState::Closed);
    assert_eq!(
        dark_mode.assignees,
        vec!["carol".to_string(), "dave".to_string(), "bob".to_string()]
    );
    // "enhancement" is not in the destination catalog.
    assert_eq!(dark_mode.labels, vec!["Project: Done".to_string()]);
}

#[tokio::test]
async fn field_sync_writes_only_differences() {
    let tracker = seeded();
    let config = config(Some("Roadmap"));

    Orchestrator::new(&tracker, &config).run().await;

    let field_writes: Vec<(String, FieldValue)> = tracker
        .writes()
        .into_iter()
        .filter_map(|w| match w {
            Write::SetFieldValue {
                item,
                field,
                value,
                ..
            } if item == "PD_7" => Some((field, value)),
            _ => None,
        })
        .collect();
    assert_eq!(field_writes, vec![("Status".to_string(), select("Done"))]);

    let login_bug = dest_issue(&tracker, "Fix login bug");
    let items = tracker.project_items("PD");
    let added = items
        .iter()
        .find(|i| i.content.as_ref().is_some_and(|c| c.issue_node_id == login_bug.node_id))
        .unwrap();
    assert_eq!(added.value("Status"), Some(&select("In Progress")));
    assert_eq!(added.value("Estimate"), Some(&FieldValue::Number(3.0)));
}

#[tokio::test]
async fn project_option_labels_use_palette() {
    let tracker = seeded();
    let config = config(Some("Roadmap"));

    let result = Orchestrator::new(&tracker, &config).run().await;

    let labels = tracker.labels(&dest_repo());
    for (name, color) in [
        ("Todo", "d73a4a"),
        ("In Progress", "fbca04"),
        ("Done", "0e8a16"),
    ] {
        let label = labels
            .iter()
            .find(|l| l.name == format!("Project: {name}"))
            .unwrap();
        assert_eq!(label.color, color, "{name}");
        assert_eq!(
            label.description,
            format!("Issue belongs to project field option: {name}")
        );
    }

    tracker.clear_writes();
    let record = Orchestrator::new(&tracker, &config)
        .run_stage(Stage::ProjectLabelCreation)
        .await;
    assert!(record.success());
    assert!(tracker.writes().is_empty());
    assert!(result.records()[2].output[0].contains("acme/api"));
}

#[tokio::test]
async fn not_found_is_isolated_to_one_issue() {
    let tracker = seeded();
    let config = config(Some("Roadmap"));
    // Same state and assignees as its source, so only label sync touches it first.
    let mut untouched = issue(&dest_repo(), 9, "Fix login bug", IssueState::Open);
    untouched.assignees = vec!["alice".to_string()];
    tracker.insert_issue(&dest_repo(), untouched);
    tracker.fail_issue(&dest_repo(), 9, InjectedFailure::NotFound);

    let result = Orchestrator::new(&tracker, &config).run().await;
    let records = result.records();

    assert_eq!(records.len(), 4);
    assert!(records[0].success());
    assert!(!records[1].success());
    assert_eq!(records[1].failures.len(), 1);
    assert_eq!(records[1].failures[0].entity, "acme/api#9");
    assert!(records[2].success());
    assert_eq!(records[2].stage, Stage::ProjectLabelCreation);

    // The other matched issue was still labelled.
    assert_eq!(
        dest_issue(&tracker, "add  Dark Mode").labels,
        vec!["Project: Done".to_string()]
    );
}

#[tokio::test]
async fn rate_limited_issue_does_not_stop_the_stage() {
    let tracker = seeded();
    let config = config(Some("Roadmap"));
    tracker.fail_issue(&dest_repo(), 7, InjectedFailure::RateLimited);

    let result = Orchestrator::new(&tracker, &config).run().await;
    let records = result.records();

    assert_eq!(records[0].failures.len(), 1);
    assert_eq!(records[0].failures[0].entity, "acme/api#7");
    assert!(records[0].failures[0].error.starts_with("Rate limited"));
    assert_eq!(records[1].failures.len(), 1);
    assert!(records[2].success());

    // The other source issue was still created and labelled.
    let login_bug = dest_issue(&tracker, "Fix login bug");
    assert_eq!(login_bug.assignees, vec!["alice".to_string()]);
    assert!(login_bug.labels.contains(&"Project: In Progress".to_string()));
}

#[tokio::test]
async fn refused_assignee_is_retried_without_assignees() {
    let tracker = seeded();
    let config = config(Some("Roadmap"));
    tracker.reject_assignee(&dest_repo(), "alice");

    let result = Orchestrator::new(&tracker, &config).run().await;
    let migration = &result.records()[0];

    assert!(migration.success(), "{:?}", migration.failures);
    assert!(migration
        .output
        .iter()
        .any(|l| l.contains("assignees alice refused on create")));
    assert!(migration
        .output
        .iter()
        .any(|l| l.contains("1 created without assignees")));

    let login_bug = dest_issue(&tracker, "Fix login bug");
    assert!(login_bug.assignees.is_empty());
    let creates = tracker
        .writes()
        .into_iter()
        .filter(|w| matches!(w, Write::CreateIssue { .. }))
        .count();
    assert_eq!(creates, 1);
}

#[tokio::test]
async fn missing_project_fails_only_project_stages() {
    let tracker = seeded();
    let config = config(None);

    let report = Orchestrator::new(&tracker, &config).run_with_report().await;

    let outcome: Vec<(&str, bool)> = report
        .stages
        .iter()
        .map(|s| (s.name.as_str(), s.success))
        .collect();
    assert_eq!(
        outcome,
        vec![
            ("issue-migration", true),
            ("label-sync", true),
            ("project-label-creation", false),
            ("project-field-sync", false),
        ]
    );
    assert_eq!(report.stages[2].error.as_deref(), Some("No project configured"));
    assert_eq!(report.success_rate, 50.0);
    assert!(report.has_failures());
}

#[tokio::test]
async fn unknown_project_is_a_stage_error() {
    let tracker = seeded();
    let config = config(Some("Nonexistent"));

    let result = Orchestrator::new(&tracker, &config).run().await;
    let records = result.records();

    assert!(records[1].success());
    assert!(records[1].output.iter().any(|l| l.contains("project columns unavailable")));
    assert_eq!(
        records[3].error.as_deref(),
        Some("Project 'Nonexistent' not found for 'legacy'")
    );
}

#[tokio::test]
async fn dry_run_leaves_destination_untouched() {
    let tracker = DryRunTracker::new(seeded());
    let mut config = config(Some("Roadmap"));
    config.dry_run = true;

    let report = Orchestrator::new(&tracker, &config).run_with_report().await;

    assert!(report.dry_run);
    assert!(report.all_success());
    let inner = tracker.into_inner();
    assert!(inner.writes().is_empty());
    assert_eq!(inner.issues(&dest_repo()).len(), 1);
}

#[tokio::test]
async fn unreadable_repository_is_an_entity_failure() {
    let tracker = seeded();
    let mut config = config(None);
    config.repos.push("ghost".to_string());

    let result = Orchestrator::new(&tracker, &config).run().await;
    let migration = &result.records()[0];

    assert_eq!(migration.failures.len(), 1);
    assert!(migration.failures[0].entity.starts_with("legacy/ghost"));
    assert_eq!(tracker.issues(&dest_repo()).len(), 2);
}
