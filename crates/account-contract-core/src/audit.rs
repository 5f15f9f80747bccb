// crates/account-contract-core/src/audit.rs
// ============================================================================
// Module: Scenario Audit Logging
// Description: Structured audit events for scenario execution.
// Purpose: Emit JSON-line progress logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Scenario progress is logged as one JSON object per line. Sinks are
//! pluggable so a run can log to stderr, append to a file, or stay silent.
//! Events never carry passwords or tokens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    /// Scenario began.
    ScenarioStarted,
    /// A step produced the expected outcome.
    StepCompleted,
    /// A step failed; the scenario stops here.
    StepFailed,
    /// Scenario ended (passed or failed).
    ScenarioFinished,
    /// Best-effort account cleanup did not succeed.
    CleanupFailed,
}

/// Scenario audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    /// Event kind.
    pub event: AuditEventKind,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Scenario name.
    pub scenario: String,
    /// Step name when the event belongs to a step.
    pub step: Option<String>,
    /// Lifecycle state reached, when tracked.
    pub state: Option<&'static str>,
    /// HTTP status observed by the step.
    pub status: Option<u16>,
    /// Free-form detail (never secrets).
    pub detail: Option<String>,
}

impl AuditEvent {
    /// Creates an event for a scenario with the current timestamp.
    #[must_use]
    pub fn new(event: AuditEventKind, scenario: &str) -> Self {
        Self {
            event,
            timestamp_ms: now_millis(),
            scenario: scenario.to_string(),
            step: None,
            state: None,
            status: None,
            detail: None,
        }
    }

    /// Attaches a step name.
    #[must_use]
    pub fn with_step(mut self, step: &str) -> Self {
        self.step = Some(step.to_string());
        self
    }

    /// Attaches the lifecycle state.
    #[must_use]
    pub const fn with_state(mut self, state: Option<&'static str>) -> Self {
        self.state = state;
        self
    }

    /// Attaches an HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    /// Attaches a detail string.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Milliseconds since the Unix epoch; zero if the clock is before it.
pub(crate) fn now_millis() -> u64 {
    duration_millis(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default())
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for scenario events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &AuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}
