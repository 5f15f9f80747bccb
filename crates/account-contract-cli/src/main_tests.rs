// crates/account-contract-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and configuration merging.
// Purpose: Ensure flags override file settings and bad input fails early.
// Dependencies: account-contract-cli main helpers, tempfile
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use account_contract_core::HarnessConfig;
use account_contract_core::ScenarioKind;
use clap::Parser;

use super::AuditTarget;
use super::Cli;
use super::CliError;
use super::Commands;
use super::RunCommand;
use super::apply_overrides;
use super::parse_audit_target;
use super::render_listing;
use super::resolve_config;
use super::selected_scenarios;

fn parse_run(args: &[&str]) -> RunCommand {
    let cli = Cli::try_parse_from(["account-contract", "run"].iter().chain(args)).expect("parse");
    match cli.command {
        Commands::Run(command) => command,
        Commands::List => panic!("expected run"),
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn run_flags_parse_into_command() {
    let command = parse_run(&[
        "--scenario",
        "verify-existing-user",
        "--scenario",
        "delete-existing-user",
        "--base-url",
        "http://127.0.0.1:9000",
        "--parallelism",
        "3",
        "--timeout-sec",
        "15",
        "--no-cleanup",
        "--audit",
        "none",
        "--report-dir",
        "out",
    ]);
    assert_eq!(
        command.scenarios,
        vec![ScenarioKind::VerifyExistingUser, ScenarioKind::DeleteExistingUser]
    );
    assert_eq!(command.base_url.as_deref(), Some("http://127.0.0.1:9000"));
    assert_eq!(command.parallelism, Some(3));
    assert_eq!(command.timeout_sec, Some(15));
    assert!(command.no_cleanup);
    assert_eq!(command.audit, Some(AuditTarget::None));
    assert_eq!(command.report_dir, Some(PathBuf::from("out")));
}

#[test]
fn unknown_scenario_is_a_parse_error() {
    let result = Cli::try_parse_from(["account-contract", "run", "--scenario", "nope"]);
    assert!(result.is_err());
}

#[test]
fn list_takes_no_arguments() {
    let cli = Cli::try_parse_from(["account-contract", "list"]).expect("parse");
    assert!(matches!(cli.command, Commands::List));
    assert!(Cli::try_parse_from(["account-contract", "list", "--base-url", "x"]).is_err());
}

#[test]
fn audit_targets_parse() {
    assert_eq!(parse_audit_target("stderr"), Ok(AuditTarget::Stderr));
    assert_eq!(parse_audit_target("none"), Ok(AuditTarget::None));
    assert_eq!(
        parse_audit_target("logs/audit.jsonl"),
        Ok(AuditTarget::File(PathBuf::from("logs/audit.jsonl")))
    );
    assert!(parse_audit_target("").is_err());
}

// ============================================================================
// SECTION: Selection
// ============================================================================

#[test]
fn empty_selection_runs_whole_catalog() {
    assert_eq!(selected_scenarios(&[]), ScenarioKind::ALL.to_vec());
}

#[test]
fn repeated_selection_is_deduplicated_in_order() {
    let selected = selected_scenarios(&[
        ScenarioKind::LoginSucceeds,
        ScenarioKind::SignupIdempotent,
        ScenarioKind::LoginSucceeds,
    ]);
    assert_eq!(selected, vec![ScenarioKind::LoginSucceeds, ScenarioKind::SignupIdempotent]);
}

#[test]
fn listing_has_one_line_per_scenario() {
    let listing = render_listing();
    assert_eq!(listing.lines().count(), ScenarioKind::ALL.len());
    for kind in ScenarioKind::ALL {
        assert!(listing.contains(kind.name()), "{kind}");
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

#[test]
fn flags_override_configuration() {
    let mut config = HarnessConfig::default();
    let command = RunCommand {
        base_url: Some("http://localhost:8080".to_string()),
        parallelism: Some(2),
        timeout_sec: Some(5),
        no_cleanup: true,
        ..RunCommand::default()
    };
    apply_overrides(&mut config, &command).expect("overrides");
    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.parallelism, 2);
    assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    assert!(!config.cleanup);
}

#[test]
fn zero_timeout_flag_is_rejected() {
    let mut config = HarnessConfig::default();
    let command = RunCommand {
        timeout_sec: Some(0),
        ..RunCommand::default()
    };
    let err = apply_overrides(&mut config, &command).unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
    assert_eq!(config.timeout, None);
}

#[test]
fn flag_wins_over_file_and_result_is_validated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("harness.toml");
    fs::write(&path, "base_url = \"http://127.0.0.1:7000\"\nparallelism = 3\n").expect("write");

    let command = RunCommand {
        config: Some(path.clone()),
        parallelism: Some(5),
        ..RunCommand::default()
    };
    let config = resolve_config(&command).expect("config");
    assert_eq!(config.base_url, "http://127.0.0.1:7000");
    assert_eq!(config.parallelism, 5);

    let invalid = RunCommand {
        config: Some(path),
        parallelism: Some(0),
        ..RunCommand::default()
    };
    assert!(matches!(resolve_config(&invalid), Err(CliError::Config(_))));
}
