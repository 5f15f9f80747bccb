// crates/account-contract-core/src/report.rs
// ============================================================================
// Module: Run Reports
// Description: Serializable per-scenario outcomes and run summaries.
// Purpose: Write deterministic JSON and Markdown summaries for a run.
// Dependencies: serde, serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! A [`RunReport`] collects one [`ScenarioOutcome`] per scenario in catalog
//! order. It serializes to canonical JSON (JCS) so two reports of the same
//! run compare byte-for-byte, and renders a short Markdown summary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::scenario::ScenarioError;
use crate::scenario::StepRecord;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Final status of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every step matched.
    Passed,
    /// A step failed or the scenario did not complete.
    Failed,
}

impl ScenarioStatus {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// Serializable view of a [`ScenarioError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    /// Error kind label.
    pub kind: &'static str,
    /// Failing step.
    pub step: String,
    /// Expected value, when the failure is a mismatch.
    pub expected: Option<String>,
    /// Observed value, when the failure is a mismatch.
    pub actual: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Observed body for status mismatches.
    pub body: Option<Value>,
}

impl FailureReport {
    /// Builds a report from a scenario error.
    #[must_use]
    pub fn from_error(err: &ScenarioError) -> Self {
        let (expected, actual, body) = match err {
            ScenarioError::Transport {
                ..
            } => (None, None, None),
            ScenarioError::UnexpectedStatus {
                expected,
                actual,
                body,
                ..
            } => (Some(expected.clone()), Some(actual.to_string()), Some(body.clone())),
            ScenarioError::UnexpectedBody {
                field,
                expected,
                actual,
                ..
            } => (Some(format!("{field} = {expected}")), Some(actual.clone()), None),
        };
        Self {
            kind: err.kind(),
            step: err.step().to_string(),
            expected,
            actual,
            message: err.to_string(),
            body,
        }
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: String,
    /// Username the scenario generated.
    pub username: String,
    /// Final status.
    pub status: ScenarioStatus,
    /// Completed steps, in order.
    pub steps: Vec<StepRecord>,
    /// Failure details when `status` is `Failed`.
    pub failure: Option<FailureReport>,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    /// Outcome for a scenario whose task ended without reporting.
    #[must_use]
    pub fn aborted(name: &str) -> Self {
        Self {
            name: name.to_string(),
            username: String::new(),
            status: ScenarioStatus::Failed,
            steps: Vec::new(),
            failure: Some(FailureReport {
                kind: "aborted",
                step: String::new(),
                expected: None,
                actual: None,
                message: "scenario task did not complete".to_string(),
                body: None,
            }),
            duration_ms: 0,
        }
    }

    /// Returns true when the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Service base URL.
    pub base_url: String,
    /// Start timestamp (milliseconds since epoch).
    pub started_at_ms: u64,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
    /// Passed scenario count.
    pub passed: usize,
    /// Failed scenario count.
    pub failed: usize,
    /// Outcomes in requested order.
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunReport {
    /// Builds a report and tallies outcomes.
    #[must_use]
    pub fn new(
        base_url: String,
        started_at_ms: u64,
        duration_ms: u64,
        outcomes: Vec<ScenarioOutcome>,
    ) -> Self {
        let passed = outcomes.iter().filter(|outcome| outcome.passed()).count();
        Self {
            base_url,
            started_at_ms,
            duration_ms,
            passed,
            failed: outcomes.len() - passed,
            outcomes,
        }
    }

    /// Returns true when no scenario failed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Looks an outcome up by scenario name.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    /// Serializes the report with canonical JCS ordering.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_jcs::to_vec(self)
    }

    /// Renders a Markdown summary.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Account Contract Summary\n\n");
        let _ = writeln!(out, "- Base URL: {}", self.base_url);
        let _ = writeln!(out, "- Passed: {}", self.passed);
        let _ = writeln!(out, "- Failed: {}", self.failed);
        let _ = writeln!(out, "- Duration (ms): {}", self.duration_ms);
        out.push_str("\n## Scenarios\n\n");
        for outcome in &self.outcomes {
            let _ = writeln!(
                out,
                "- {} `{}` ({} steps, {} ms)",
                outcome.status.as_str(),
                outcome.name,
                outcome.steps.len(),
                outcome.duration_ms
            );
            if let Some(failure) = &outcome.failure {
                let _ = writeln!(out, "  - {}", failure.message);
            }
        }
        out
    }

    /// Writes `report.json` and `report.md` into `dir`, creating it.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or files cannot be written.
    pub fn write_artifacts(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let json_path = dir.join("report.json");
        let bytes = self.to_canonical_json().map_err(io::Error::other)?;
        fs::write(&json_path, bytes)?;
        let md_path = dir.join("report.md");
        fs::write(&md_path, self.to_markdown())?;
        Ok(vec![json_path, md_path])
    }
}
