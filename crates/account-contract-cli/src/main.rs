// crates/account-contract-cli/src/main.rs
// ============================================================================
// Module: Account Contract CLI Entry Point
// Description: Command dispatcher for listing and running contract scenarios.
// Purpose: Run the scenario catalog against a configured account service.
// Dependencies: account-contract-core, clap, thiserror, tokio
// ============================================================================

//! ## Overview
//! `account-contract list` prints the scenario catalog. `account-contract run`
//! merges defaults, an optional TOML file, `ACCOUNT_CONTRACT_*` variables and
//! command-line flags (later wins), runs the selected scenarios and prints a
//! Markdown summary.
//!
//! Exit codes: 0 when every scenario passed, 1 when any failed, 2 when the
//! run could not start or its output could not be written.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use account_contract_core::AuditSink;
use account_contract_core::ConfigError;
use account_contract_core::FileAuditSink;
use account_contract_core::HarnessConfig;
use account_contract_core::NoopAuditSink;
use account_contract_core::ScenarioKind;
use account_contract_core::ScenarioRunner;
use account_contract_core::StderrAuditSink;
use account_contract_core::TransportError;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Arguments
// ============================================================================

/// Contract test harness for user-account HTTP services.
#[derive(Parser, Debug)]
#[command(name = "account-contract", version, disable_help_subcommand = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List built-in scenarios.
    List,
    /// Run scenarios against the configured service.
    Run(RunCommand),
}

/// Arguments for `run`.
#[derive(Args, Debug, Default)]
struct RunCommand {
    /// Scenario to run; repeat to select several. Defaults to all.
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<ScenarioKind>,
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Service base URL.
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    /// Maximum scenarios in flight.
    #[arg(long, value_name = "N")]
    parallelism: Option<usize>,
    /// Per-request timeout in seconds.
    #[arg(long = "timeout-sec", value_name = "N")]
    timeout_sec: Option<u64>,
    /// Keep accounts created by non-delete scenarios.
    #[arg(long = "no-cleanup")]
    no_cleanup: bool,
    /// Audit destination: `stderr`, `none` or a file path.
    #[arg(long, value_name = "TARGET", value_parser = parse_audit_target)]
    audit: Option<AuditTarget>,
    /// Directory for `report.json` and `report.md`.
    #[arg(long = "report-dir", value_name = "DIR")]
    report_dir: Option<PathBuf>,
}

/// Where audit events go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AuditTarget {
    /// JSON lines on stderr.
    Stderr,
    /// Discard events.
    None,
    /// Append JSON lines to a file.
    File(PathBuf),
}

/// Parses an `--audit` value.
fn parse_audit_target(raw: &str) -> Result<AuditTarget, String> {
    match raw {
        "" => Err("audit target must not be empty".to_string()),
        "stderr" => Ok(AuditTarget::Stderr),
        "none" => Ok(AuditTarget::None),
        path => Ok(AuditTarget::File(PathBuf::from(path))),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that stop the CLI before or after a run.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// HTTP transport could not be constructed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// Audit log could not be opened.
    #[error("cannot open audit log {path}: {source}")]
    Audit {
        /// Audit log path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Report artifacts could not be written.
    #[error("cannot write report artifacts: {0}")]
    Artifacts(std::io::Error),
    /// Writing to a standard stream failed.
    #[error("failed to write {stream}: {source}")]
    Output {
        /// Stream label.
        stream: &'static str,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

/// Exit code when at least one scenario failed.
const EXIT_SCENARIO_FAILED: u8 = 1;
/// Exit code when the run could not be performed.
const EXIT_ERROR: u8 = 2;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            let _ = writeln!(std::io::stderr(), "{err}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Dispatches the parsed command.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::List => {
            write_stdout(&render_listing())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run(command) => command_run(command).await,
    }
}

/// Executes `run`.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command)?;
    let audit = open_audit(command.audit.as_ref().unwrap_or(&AuditTarget::Stderr))?;
    let runner = ScenarioRunner::from_config(config, audit)?;
    let report = runner.run_all(&selected_scenarios(&command.scenarios)).await;

    if let Some(dir) = &command.report_dir {
        report.write_artifacts(dir).map_err(CliError::Artifacts)?;
    }
    write_stdout(&report.to_markdown())?;
    if report.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_SCENARIO_FAILED))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Merges defaults, file, environment and flags, then validates.
fn resolve_config(command: &RunCommand) -> CliResult<HarnessConfig> {
    let mut config = match &command.config {
        Some(path) => HarnessConfig::from_file(path)?,
        None => HarnessConfig::default(),
    };
    config.apply_env()?;
    apply_overrides(&mut config, command)?;
    config.validate()?;
    Ok(config)
}

/// Applies command-line flags on top of the merged configuration.
fn apply_overrides(config: &mut HarnessConfig, command: &RunCommand) -> CliResult<()> {
    if let Some(base_url) = &command.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(parallelism) = command.parallelism {
        config.parallelism = parallelism;
    }
    if let Some(secs) = command.timeout_sec {
        if secs == 0 {
            return Err(ConfigError::Invalid("--timeout-sec must be greater than zero".to_string())
                .into());
        }
        config.timeout = Some(Duration::from_secs(secs));
    }
    if command.no_cleanup {
        config.cleanup = false;
    }
    Ok(())
}

/// Builds the audit sink for a target.
fn open_audit(target: &AuditTarget) -> CliResult<Arc<dyn AuditSink>> {
    match target {
        AuditTarget::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditTarget::None => Ok(Arc::new(NoopAuditSink)),
        AuditTarget::File(path) => {
            let sink = FileAuditSink::new(path).map_err(|source| CliError::Audit {
                path: path.display().to_string(),
                source,
            })?;
            Ok(Arc::new(sink))
        }
    }
}

/// Returns the requested scenarios in first-seen order, or the whole catalog.
fn selected_scenarios(requested: &[ScenarioKind]) -> Vec<ScenarioKind> {
    if requested.is_empty() {
        return ScenarioKind::ALL.to_vec();
    }
    let mut selected = Vec::with_capacity(requested.len());
    for kind in requested {
        if !selected.contains(kind) {
            selected.push(*kind);
        }
    }
    selected
}

/// Renders the catalog listing.
fn render_listing() -> String {
    let width = ScenarioKind::ALL.iter().map(|kind| kind.name().len()).max().unwrap_or(0);
    let mut out = String::new();
    for kind in ScenarioKind::ALL {
        let _ = writeln!(out, "{:<width$}  {}", kind.name(), kind.description());
    }
    out
}

/// Writes text to stdout.
fn write_stdout(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()).map_err(|source| {
        CliError::Output {
            stream: "stdout",
            source,
        }
    })
}
