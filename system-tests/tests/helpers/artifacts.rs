// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: account-contract-core, system-tests, serde, serde_jcs
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use account_contract_core::RunReport;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

#[derive(Debug, Serialize)]
struct TestSummary<'a> {
    test_name: &'a str,
    status: &'a str,
    base_url: &'a str,
    passed: usize,
    failed: usize,
    duration_ms: u64,
    artifacts: Vec<String>,
}

fn now_millis() -> u64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Artifact manager for a single system-test.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    root: PathBuf,
}

impl TestArtifacts {
    /// Creates the artifact root for a test.
    pub fn new(config: &SystemTestConfig, test_name: &str) -> io::Result<Self> {
        let base = config
            .run_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("target/system-tests"))
            .join(format!("run_{}", now_millis()));
        let root = base.join(test_name);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory for the test artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the run report and a canonical JSON summary.
    pub fn write_run(&self, test_name: &str, report: &RunReport) -> io::Result<PathBuf> {
        let written = report.write_artifacts(&self.root)?;
        let summary = TestSummary {
            test_name,
            status: if report.all_passed() { "passed" } else { "failed" },
            base_url: &report.base_url,
            passed: report.passed,
            failed: report.failed,
            duration_ms: report.duration_ms,
            artifacts: written.iter().map(|path| path.display().to_string()).collect(),
        };
        let path = self.root.join("summary.json");
        let bytes = serde_jcs::to_vec(&summary).map_err(io::Error::other)?;
        fs::write(&path, bytes)?;
        Ok(path)
    }
}
