use std::path::PathBuf;

use issue_sync::{ConfigError, SyncConfig};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn load_full_config_from_fixture() {
    let config = SyncConfig::load(&fixture("full.toml")).unwrap();

    assert_eq!(config.source_org, "acme-legacy");
    assert_eq!(config.dest_org, "acme");
    assert_eq!(config.repos, vec!["api".to_string(), "web".to_string()]);
    assert_eq!(config.project.as_deref(), Some("Roadmap"));
    assert_eq!(config.column_field, "Stage");
    assert_eq!(config.fields, vec!["Stage".to_string(), "Estimate".to_string()]);
    assert_eq!(config.sizing_prefixes, vec!["Size:".to_string(), "Effort:".to_string()]);
    assert!(config.label_case_insensitive);
    assert_eq!(config.output_lines, 5);
    assert!(config.dry_run);
    config.validate("full.toml").unwrap();
}

#[test]
fn partial_config_needs_overlay() {
    let mut config = SyncConfig::load(&fixture("partial.toml")).unwrap();

    assert!(matches!(
        config.validate("partial.toml"),
        Err(ConfigError::ValidationError { .. })
    ));

    config.source_org = "acme-legacy".to_string();
    config.dest_org = "acme".to_string();
    config.repos = vec!["api".to_string()];
    config.validate("partial.toml").unwrap();
    assert_eq!(config.column_field, "Status");
}

#[test]
fn invalid_config_reports_path() {
    let path = fixture("invalid.toml");
    let config = SyncConfig::load(&path).unwrap();

    let error = config.validate(&path.display().to_string()).unwrap_err();

    assert!(error.to_string().contains("invalid.toml"));
    assert!(error.to_string().contains("repos"));
}

#[test]
fn missing_file_is_io_error() {
    let temp = tempfile::TempDir::new().unwrap();
    let result = SyncConfig::load(&temp.path().join("absent.toml"));

    assert!(matches!(result, Err(ConfigError::IoError { .. })));
}

#[test]
fn malformed_file_is_toml_error() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("sync.toml");
    std::fs::write(&path, "repos = \"api\"\n").unwrap();

    let result = SyncConfig::load(&path);

    assert!(matches!(result, Err(ConfigError::TomlError { .. })));
}
