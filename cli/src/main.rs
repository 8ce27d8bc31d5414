//! CLI for issue-sync.
//!
//! Migrates issues, labels and project field values from a source GitHub
//! organization into a destination organization, then prints a per-stage
//! report.

use clap::Parser;
use issue_sync::{RunReport, Runner, RunnerConfig, RunnerError, SyncConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// issue-sync - Reconcile issues, labels and project fields between two GitHub organizations.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file. Arguments override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Organization or user owning the source repositories.
    #[arg(long, env = "ORG_SOURCE")]
    source_org: Option<String>,

    /// Organization or user owning the destination repositories.
    #[arg(long, env = "ORG_DEST")]
    dest_org: Option<String>,

    /// Comma-separated repository names present in both organizations.
    #[arg(long, env = "REPOS", value_delimiter = ',')]
    repos: Vec<String>,

    /// Projects-V2 title to synchronize.
    #[arg(long, env = "PROJECT")]
    project: Option<String>,

    /// Single-select field holding the project column.
    #[arg(long)]
    column_field: Option<String>,

    /// Comma-separated project fields to synchronize (default: all shared fields).
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,

    /// Treat label names that differ only in case as the same label.
    #[arg(long)]
    label_case_insensitive: bool,

    /// Output lines kept per stage in the report.
    #[arg(long)]
    output_lines: Option<usize>,

    /// Log writes without applying them.
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Must precede argument parsing so env-backed arguments see it
    load_env_file();

    // Parse arguments
    let args = Args::parse();
    let json = args.json;

    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    // Run the main logic
    match run(args).await {
        Ok(report) => {
            print_report(&report, json);

            if report.all_success() {
                ExitCode::from(0)
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Loads `.env` from the working directory if it exists.
fn load_env_file() {
    if !Path::new(".env").exists() {
        return;
    }
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(e) => warn!(error = %e, "Failed to load .env file"),
    }
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunReport, RunnerError> {
    let sync = build_config(&args)?;
    let runner = Runner::new(RunnerConfig::new(sync, args.token))?;
    Ok(runner.run().await)
}

/// Reads the config file, if any, and overlays the arguments on it.
fn build_config(args: &Args) -> Result<SyncConfig, RunnerError> {
    let mut config = match &args.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };

    if let Some(source_org) = &args.source_org {
        config.source_org = source_org.trim().to_string();
    }
    if let Some(dest_org) = &args.dest_org {
        config.dest_org = dest_org.trim().to_string();
    }
    let repos = non_blank(&args.repos);
    if !repos.is_empty() {
        config.repos = repos;
    }
    if let Some(project) = &args.project {
        config.project = Some(project.trim().to_string());
    }
    if let Some(column_field) = &args.column_field {
        config.column_field = column_field.clone();
    }
    let fields = non_blank(&args.fields);
    if !fields.is_empty() {
        config.fields = fields;
    }
    if let Some(output_lines) = args.output_lines {
        config.output_lines = output_lines;
    }
    config.label_case_insensitive |= args.label_case_insensitive;
    config.dry_run |= args.dry_run;

    Ok(config)
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Prints the final run report.
fn print_report(report: &RunReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(rendered) => {
                println!("{rendered}");
                return;
            }
            Err(e) => warn!(error = %e, "Failed to render JSON report"),
        }
    }
    println!("\n{report}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_override_defaults() {
        let args = Args::parse_from([
            "issue-sync",
            "--token",
            "t",
            "--source-org",
            "legacy",
            "--dest-org",
            "acme",
            "--repos",
            "api, web,",
            "--dry-run",
        ]);

        let config = build_config(&args).unwrap();

        assert_eq!(config.repos, vec!["api".to_string(), "web".to_string()]);
        assert!(config.dry_run);
        assert_eq!(config.column_field, "Status");
        config.validate("arguments").unwrap();
    }
}
