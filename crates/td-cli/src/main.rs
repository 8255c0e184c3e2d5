//! CLI entry point for todo-scan.
//!
//! Scans a GitHub repository for `todo` / `bug` markers in source comments.
//!
//! # Usage
//!
//! ```bash
//! todo-scan [OPTIONS] <COMMAND>
//!
//! # Scan and print matches
//! todo-scan scan rust-lang/cargo --format text
//!
//! # Rescan only if changed since the last run
//! todo-scan scan rust-lang/cargo --since 2024-05-01T00:00:00Z --output cargo.json
//!
//! # Check staleness and rate budget without scanning
//! todo-scan check rust-lang/cargo
//!
//! # Show repository metadata
//! todo-scan info rust-lang/cargo
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::thread;

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use serde::Serialize;
use td_core::{Config, FileMatch, RepoRef, RepositoryInfo};
use td_github::GithubClient;
use td_scanner::{
    InfoSource, RefreshOutcome, RemoteSource, ScanCoordinator, ScanPlan, ScanReport,
    StatsSnapshot, WalkUpdate,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Capacity of the walk update channel.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Finds todo and bug markers in the comments of a GitHub repository.
#[derive(Parser)]
#[command(name = "todo-scan", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "TODO_SCAN_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Git ref to scan (overrides `scan.git_ref`).
    #[arg(long = "ref", global = true, env = "TODO_SCAN_REF")]
    git_ref: Option<String>,

    /// GitHub token (overrides `github.token`).
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Number of fetch workers (overrides `scan.workers`).
    #[arg(short = 'j', long, global = true)]
    workers: Option<usize>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan a repository and print the marker lines found.
    Scan {
        /// Repository as `owner/name`.
        repo: RepoRef,

        /// Time of the previous scan; skip the scan if nothing changed since.
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Report staleness and whether the rate budget allows a scan.
    Check {
        /// Repository as `owner/name`.
        repo: RepoRef,

        /// Time of the previous scan.
        #[arg(long)]
        since: Option<DateTime<Utc>>,
    },

    /// Print repository metadata as JSON.
    Info {
        /// Repository as `owner/name`.
        repo: RepoRef,
    },
}

/// Scan output format.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// JSON document.
    Json,
    /// Human-readable listing.
    Text,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose`, or
/// `info` by default. HTTP internals are filtered to `warn`. Logs go to
/// stderr so stdout carries only the report.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the config file and CLI overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the result is invalid.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load configuration from {path}"))?,
        None => Config::default(),
    };

    if let Some(git_ref) = &cli.git_ref {
        config.scan.git_ref.clone_from(git_ref);
    }
    if cli.token.is_some() {
        config.github.token.clone_from(&cli.token);
    }
    if cli.workers.is_some() {
        config.scan.workers = cli.workers;
    }

    config.validate()?;
    Ok(config)
}

/// Creates a coordinator backed by the GitHub adapter.
fn create_coordinator(
    config: &Config,
    repo: &RepoRef,
) -> color_eyre::Result<ScanCoordinator<GithubClient>> {
    let client = GithubClient::new(&config.github, repo.clone())?;
    ScanCoordinator::new(client, &config.scan)
        .map_err(|e| eyre!("Failed to create scanner: {e}"))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs a scan if the repository is stale and the budget allows.
///
/// A fresh repository or a deferred scan is reported and is not an error.
fn run_scan(
    config: &Config,
    repo: &RepoRef,
    since: Option<DateTime<Utc>>,
    format: OutputFormat,
    output: Option<&Utf8PathBuf>,
) -> color_eyre::Result<()> {
    let coordinator = create_coordinator(config, repo)?;

    let (report, info) = match refresh_with_progress(&coordinator, repo, since)? {
        RefreshOutcome::Fresh => {
            info!(%repo, "Repository unchanged since last scan, nothing to do");
            return Ok(());
        }
        RefreshOutcome::Deferred {
            estimated_cost,
            remaining_budget,
        } => {
            warn!(
                %repo,
                estimated_cost,
                remaining_budget,
                "Rate budget too low, scan deferred"
            );
            return Ok(());
        }
        RefreshOutcome::Scanned { report, info } => (report, info),
    };

    if !report.is_complete() {
        warn!(
            %repo,
            failed = report.errors.len(),
            "Some files could not be fetched, result is partial"
        );
    }

    let git_ref = coordinator.git_ref();
    let content = match format {
        OutputFormat::Json => render_json(repo, git_ref, &report, info.as_ref())?,
        OutputFormat::Text => render_text(repo, git_ref, &report),
    };

    if let Some(path) = output {
        std::fs::write(path.as_std_path(), format!("{content}\n"))
            .wrap_err_with(|| format!("Failed to write report to {path}"))?;
        info!(%path, "Report written");
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{content}")?;
    }

    if let Some(remaining) = coordinator.source().last_known_remaining() {
        debug!(remaining, "Rate budget after scan");
    }

    Ok(())
}

/// Runs [`ScanCoordinator::refresh_streaming`] on a scoped thread while
/// logging walk updates as they arrive.
fn refresh_with_progress<S: RemoteSource>(
    coordinator: &ScanCoordinator<S>,
    repo: &RepoRef,
    since: Option<DateTime<Utc>>,
) -> color_eyre::Result<RefreshOutcome> {
    let (tx, mut rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);

    let outcome = thread::scope(|scope| {
        let handle = scope.spawn(move || coordinator.refresh_streaming(repo, since, tx));

        while let Some(update) = rx.blocking_recv() {
            match update {
                WalkUpdate::EntriesDiscovered(count) => info!(entries = count, "Scanning tree"),
                WalkUpdate::FileMatched(file) => {
                    debug!(path = %file.path, lines = file.line_count(), "Markers found");
                }
                WalkUpdate::FileError(error) => warn!(%error, "File skipped"),
                WalkUpdate::Complete(stats) => {
                    debug!(fetched = stats.fetched, matched_files = stats.matched_files, "Walk done");
                }
            }
        }

        handle.join()
    });

    let outcome = outcome.map_err(|_| eyre!("Scan thread panicked"))?;
    Ok(outcome?)
}

/// Returns `(estimated_cost, remaining_budget)` as seen by the plan.
fn plan_budget(plan: &ScanPlan) -> (u64, u64) {
    match plan {
        ScanPlan::Ready {
            snapshot,
            remaining_budget,
        } => (
            u64::try_from(snapshot.len()).unwrap_or(u64::MAX),
            *remaining_budget,
        ),
        ScanPlan::Deferred {
            estimated_cost,
            remaining_budget,
        } => (*estimated_cost, *remaining_budget),
    }
}

/// Prints existence, staleness, and budget for a repository.
fn run_check(
    config: &Config,
    repo: &RepoRef,
    since: Option<DateTime<Utc>>,
) -> color_eyre::Result<()> {
    let coordinator = create_coordinator(config, repo)?;

    if !coordinator.exists(repo)? {
        return Err(eyre!("Repository not found: {repo}"));
    }

    let stale = coordinator.is_stale(repo, since)?;
    let plan = coordinator.plan(repo)?;
    let (estimated_cost, remaining_budget) = plan_budget(&plan);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{repo}@{}", coordinator.git_ref())?;
    writeln!(handle, "  stale:          {}", if stale { "yes" } else { "no" })?;
    writeln!(handle, "  estimated cost: {estimated_cost}")?;
    writeln!(handle, "  remaining:      {remaining_budget}")?;
    writeln!(
        handle,
        "  scan:           {}",
        if matches!(plan, ScanPlan::Ready { .. }) {
            "allowed"
        } else {
            "deferred"
        }
    )?;

    Ok(())
}

/// Prints repository metadata as JSON.
fn run_info(config: &Config, repo: &RepoRef) -> color_eyre::Result<()> {
    let client = GithubClient::new(&config.github, repo.clone())?;
    let info = client
        .info(repo)
        .wrap_err_with(|| format!("Failed to fetch metadata for {repo}"))?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", serde_json::to_string_pretty(&info)?)?;
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Renders a scan report as a JSON document.
fn render_json(
    repo: &RepoRef,
    git_ref: &str,
    report: &ScanReport,
    info: Option<&RepositoryInfo>,
) -> color_eyre::Result<String> {
    #[derive(Serialize)]
    struct FailedFile<'a> {
        path: Option<&'a Utf8PathBuf>,
        error: String,
    }

    #[derive(Serialize)]
    struct Report<'a> {
        repository: String,
        git_ref: &'a str,
        stats: &'a StatsSnapshot,
        files: Vec<&'a FileMatch>,
        errors: Vec<FailedFile<'a>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        info: Option<&'a RepositoryInfo>,
    }

    let document = Report {
        repository: repo.to_string(),
        git_ref,
        stats: &report.stats,
        files: report.result.sorted_by_path(),
        errors: report
            .errors
            .iter()
            .map(|error| FailedFile {
                path: error.path(),
                error: error.to_string(),
            })
            .collect(),
        info,
    };

    serde_json::to_string_pretty(&document)
        .map_err(|e| eyre!("Failed to serialize JSON: {e}"))
}

/// Renders a scan report as a human-readable listing.
fn render_text(repo: &RepoRef, git_ref: &str, report: &ScanReport) -> String {
    use std::fmt::Write;

    let stats = &report.stats;
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{repo}@{git_ref}: {} files, {} marker lines",
        report.result.len(),
        report.result.total_lines()
    );
    let _ = write!(
        output,
        "{} fetched, {} pre-filtered, {} skipped, {} failed",
        stats.fetched_ok(),
        stats.prefiltered,
        stats.skipped(),
        stats.fetch_errors
    );

    let files = report.result.sorted_by_path();
    if !files.is_empty() {
        output.push('\n');
    }
    for file in files {
        let lines: Vec<String> = file.lines.iter().map(u32::to_string).collect();
        let _ = write!(
            output,
            "\n{} [{}]\n  lines {}",
            file.path,
            file.language,
            lines.join(", ")
        );
    }

    if !report.errors.is_empty() {
        output.push_str("\n\nfailed:");
        for error in &report.errors {
            let _ = write!(output, "\n  {error}");
        }
    }

    output
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
///
/// Synchronous on purpose: the GitHub adapter uses a blocking HTTP client,
/// which must not run inside an async runtime.
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.no_color);

    let config = build_config(&cli)?;

    match &cli.command {
        Commands::Scan {
            repo,
            since,
            format,
            output,
        } => run_scan(&config, repo, *since, *format, output.as_ref()),
        Commands::Check { repo, since } => run_check(&config, repo, *since),
        Commands::Info { repo } => run_info(&config, repo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_core::{ContentId, LineNumbers, ScanConfig, ScanResult, TreeEntry};
    use td_scanner::{MemorySource, ScanError, SourceError};

    fn file(id: &str, path: &str, language: &str, lines: &[u32]) -> FileMatch {
        FileMatch {
            content_id: ContentId::new(id),
            path: path.into(),
            language: language.to_owned(),
            lines: LineNumbers::from_slice(lines),
        }
    }

    fn sample_report() -> ScanReport {
        let mut result = ScanResult::new();
        result.insert(file("b4", "src/app.js", "js", &[1]));
        result.insert(file("b1", "lib/a.rb", "rb", &[2, 5]));

        ScanReport {
            result,
            errors: vec![ScanError::fetch(
                "vendor/big.c",
                ContentId::new("b9"),
                SourceError::Timeout("10s".to_owned()),
            )],
            stats: StatsSnapshot {
                entries: 7,
                blobs: 6,
                unclassified: 1,
                unsupported: 1,
                fetched: 4,
                fetch_errors: 1,
                prefiltered: 1,
                matched_files: 2,
                matched_lines: 3,
            },
        }
    }

    #[test]
    fn test_render_text() {
        let repo = RepoRef::new("octocat", "hello");
        insta::assert_snapshot!(render_text(&repo, "master", &sample_report()), @r"
        octocat/hello@master: 2 files, 3 marker lines
        3 fetched, 1 pre-filtered, 2 skipped, 1 failed

        lib/a.rb [rb]
          lines 2, 5
        src/app.js [js]
          lines 1

        failed:
          failed to fetch vendor/big.c (b9): timed out: 10s
        ");
    }

    #[test]
    fn test_render_text_empty() {
        let report = ScanReport {
            result: ScanResult::new(),
            errors: Vec::new(),
            stats: StatsSnapshot::default(),
        };
        let text = render_text(&RepoRef::new("a", "b"), "main", &report);
        assert_eq!(
            text,
            "a/b@main: 0 files, 0 marker lines\n0 fetched, 0 pre-filtered, 0 skipped, 0 failed"
        );
    }

    #[test]
    fn test_render_json() {
        let repo = RepoRef::new("octocat", "hello");
        let info = RepositoryInfo {
            stars: 3,
            ..RepositoryInfo::default()
        };
        let json = render_json(&repo, "master", &sample_report(), Some(&info)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["repository"], "octocat/hello");
        assert_eq!(value["files"][0]["path"], "lib/a.rb");
        assert_eq!(value["files"][0]["lines"], serde_json::json!([2, 5]));
        assert_eq!(value["errors"][0]["path"], "vendor/big.c");
        assert_eq!(value["stats"]["matched_lines"], 3);
        assert_eq!(value["info"]["stars"], 3);
    }

    #[test]
    fn test_render_json_without_info() {
        let json = render_json(&RepoRef::new("a", "b"), "master", &sample_report(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("info").is_none());
    }

    fn memory_coordinator(budget: u64) -> ScanCoordinator<MemorySource> {
        let source = MemorySource::new()
            .with_tree(
                &RepoRef::new("octocat", "hello"),
                "master",
                vec![
                    TreeEntry::blob("a.rb", "b1"),
                    TreeEntry::blob("b.c", "b2"),
                ],
            )
            .with_blob("b1", "# TODO: fix\n")
            .with_failing_blob("b2")
            .with_remaining_calls(budget);
        ScanCoordinator::new(source, &ScanConfig::default()).unwrap()
    }

    #[test]
    fn test_refresh_with_progress_scans() {
        let coordinator = memory_coordinator(500);
        let repo = RepoRef::new("octocat", "hello");

        let outcome = refresh_with_progress(&coordinator, &repo, None).unwrap();
        let RefreshOutcome::Scanned { report, .. } = outcome else {
            panic!("expected a scan");
        };
        assert_eq!(report.result.total_lines(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].path().map(|p| p.as_str()),
            Some("b.c")
        );
    }

    #[test]
    fn test_refresh_with_progress_deferred() {
        let coordinator = memory_coordinator(10);
        let repo = RepoRef::new("octocat", "hello");

        let outcome = refresh_with_progress(&coordinator, &repo, None).unwrap();
        assert!(matches!(
            outcome,
            RefreshOutcome::Deferred {
                estimated_cost: 2,
                remaining_budget: 10
            }
        ));
        assert_eq!(coordinator.source().fetch_count(), 0);
    }

    #[test]
    fn test_plan_budget_uses_planned_budget() {
        let coordinator = memory_coordinator(500);
        let plan = coordinator.plan(&RepoRef::new("octocat", "hello")).unwrap();
        assert_eq!(plan_budget(&plan), (2, 500));

        let deferred = ScanPlan::Deferred {
            estimated_cost: 40,
            remaining_budget: 90,
        };
        assert_eq!(plan_budget(&deferred), (40, 90));
    }

    #[test]
    fn test_cli_parses_scan() {
        let cli = Cli::try_parse_from([
            "todo-scan",
            "scan",
            "octocat/hello",
            "--since",
            "2024-01-01T00:00:00Z",
            "--format",
            "text",
            "--ref",
            "main",
        ])
        .unwrap();
        assert_eq!(cli.git_ref.as_deref(), Some("main"));
        let Commands::Scan { repo, since, .. } = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(repo, RepoRef::new("octocat", "hello"));
        assert!(since.is_some());
    }

    #[test]
    fn test_cli_rejects_bad_repo() {
        assert!(Cli::try_parse_from(["todo-scan", "info", "not-a-repo"]).is_err());
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
