// crates/account-contract-core/src/scenario.rs
// ============================================================================
// Module: Scenario Runner
// Description: Executes contract scenarios and collects per-step outcomes.
// Purpose: Isolate scenarios, short-circuit on the first failed step, report.
// Dependencies: tokio, thiserror, serde_json, crate::{account, audit, catalog,
//              config, report, transport}
// ============================================================================

//! ## Overview
//! A scenario is an ordered chain of dependent account calls. The runner
//! gives each scenario its own [`ScenarioContext`] (fresh credentials, its own
//! step log) so nothing mutable is shared between scenarios. Within a
//! scenario the first mismatch ends it with a [`ScenarioError`] naming the
//! step, the expected value and what actually came back. Other scenarios
//! keep running.
//!
//! Scenarios may run concurrently, bounded by
//! [`HarnessConfig::parallelism`]; calls inside one scenario are always
//! sequential because each depends on the previous response.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::account::AccountClient;
use crate::account::Credentials;
use crate::audit::AuditEvent;
use crate::audit::AuditEventKind;
use crate::audit::AuditSink;
use crate::audit::duration_millis;
use crate::audit::now_millis;
use crate::catalog::ScenarioKind;
use crate::config::HarnessConfig;
use crate::report::FailureReport;
use crate::report::RunReport;
use crate::report::ScenarioOutcome;
use crate::report::ScenarioStatus;
use crate::transport::ReqwestTransport;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Lifecycle State
// ============================================================================

/// States of the authenticated account lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Account registered.
    Created,
    /// Token issued for the account.
    Tokened,
    /// Lookup echoed the account id.
    Verified,
    /// Account deleted.
    Deleted,
    /// Lookup after delete reported the account missing.
    VerifiedAbsent,
}

impl LifecycleState {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Tokened => "tokened",
            Self::Verified => "verified",
            Self::Deleted => "deleted",
            Self::VerifiedAbsent => "verified_absent",
        }
    }
}

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Accepted HTTP statuses for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusExpectation {
    /// Exactly this status.
    Exactly(u16),
    /// Any status in the set.
    AnyOf(&'static [u16]),
    /// Anything but this status.
    Not(u16),
}

impl StatusExpectation {
    /// Returns true when `status` satisfies the expectation.
    #[must_use]
    pub fn matches(self, status: u16) -> bool {
        match self {
            Self::Exactly(expected) => status == expected,
            Self::AnyOf(accepted) => accepted.contains(&status),
            Self::Not(rejected) => status != rejected,
        }
    }
}

impl fmt::Display for StatusExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(expected) => write!(f, "{expected}"),
            Self::AnyOf(accepted) => {
                let joined: Vec<String> = accepted.iter().map(u16::to_string).collect();
                write!(f, "one of [{}]", joined.join(", "))
            }
            Self::Not(rejected) => write!(f, "anything but {rejected}"),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why a scenario stopped.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// No HTTP response was received.
    #[error("step {step}: {source}")]
    Transport {
        /// Step that issued the call.
        step: &'static str,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },
    /// Status code differed from the expectation.
    #[error("step {step}: expected status {expected}, got {actual}")]
    UnexpectedStatus {
        /// Step that issued the call.
        step: &'static str,
        /// Rendered expectation.
        expected: String,
        /// Observed status.
        actual: u16,
        /// Observed body, for diagnosis.
        body: Value,
    },
    /// Body shape or field value differed from the expectation.
    #[error("step {step}: expected {field} = {expected}, got {actual}")]
    UnexpectedBody {
        /// Step that issued the call.
        step: &'static str,
        /// Body field that was checked.
        field: &'static str,
        /// Expected value.
        expected: String,
        /// Observed value (`<missing>` when absent).
        actual: String,
    },
}

impl ScenarioError {
    /// Returns the step the error belongs to.
    #[must_use]
    pub const fn step(&self) -> &'static str {
        match self {
            Self::Transport {
                step, ..
            }
            | Self::UnexpectedStatus {
                step, ..
            }
            | Self::UnexpectedBody {
                step, ..
            } => step,
        }
    }

    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport {
                ..
            } => "transport",
            Self::UnexpectedStatus {
                ..
            } => "unexpected_status",
            Self::UnexpectedBody {
                ..
            } => "unexpected_body",
        }
    }

    /// Returns a closure that tags a transport error with its step.
    pub fn transport(step: &'static str) -> impl FnOnce(TransportError) -> Self {
        move |source| Self::Transport {
            step,
            source,
        }
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// One completed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Step name.
    pub step: &'static str,
    /// Lifecycle state reached, when the step advances the lifecycle.
    pub state: Option<LifecycleState>,
    /// HTTP status observed.
    pub status: Option<u16>,
}

/// Per-scenario execution state.
///
/// # Invariants
/// - Owned by exactly one scenario; never shared across scenarios.
/// - `credentials` are generated when the context is created.
pub struct ScenarioContext {
    /// Scenario name.
    name: &'static str,
    /// Account operations.
    client: AccountClient,
    /// Harness configuration.
    config: Arc<HarnessConfig>,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
    /// Credentials owned by this scenario.
    credentials: Credentials,
    /// Completed steps, in order.
    steps: Mutex<Vec<StepRecord>>,
}

impl ScenarioContext {
    /// Creates a context with fresh credentials.
    #[must_use]
    pub fn new(
        name: &'static str,
        client: AccountClient,
        config: Arc<HarnessConfig>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let credentials = config.fresh_credentials();
        Self {
            name,
            client,
            config,
            audit,
            credentials,
            steps: Mutex::new(Vec::new()),
        }
    }

    /// Scenario name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Account operations.
    #[must_use]
    pub const fn client(&self) -> &AccountClient {
        &self.client
    }

    /// Harness configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Credentials owned by this scenario.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns a snapshot of completed steps.
    #[must_use]
    pub fn steps(&self) -> Vec<StepRecord> {
        self.steps.lock().map_or_else(|_| Vec::new(), |steps| steps.clone())
    }

    /// Records a completed step.
    pub fn pass(&self, step: &'static str, state: Option<LifecycleState>, status: Option<u16>) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push(StepRecord {
                step,
                state,
                status,
            });
        }
        self.audit.record(
            &AuditEvent::new(AuditEventKind::StepCompleted, self.name)
                .with_step(step)
                .with_state(state.map(LifecycleState::as_str))
                .with_status(status),
        );
    }

    /// Records an audit event for this scenario.
    pub fn audit(&self, event: &AuditEvent) {
        self.audit.record(event);
    }

    /// Asserts that a status satisfies the expectation.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnexpectedStatus`] on mismatch.
    pub fn expect_status(
        &self,
        step: &'static str,
        expected: StatusExpectation,
        actual: u16,
        body: &Value,
    ) -> Result<(), ScenarioError> {
        if expected.matches(actual) {
            return Ok(());
        }
        Err(ScenarioError::UnexpectedStatus {
            step,
            expected: expected.to_string(),
            actual,
            body: body.clone(),
        })
    }

    /// Asserts that an optional body field equals the expected value.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnexpectedBody`] on mismatch or absence.
    pub fn expect_field(
        &self,
        step: &'static str,
        field: &'static str,
        expected: &str,
        actual: Option<&str>,
    ) -> Result<(), ScenarioError> {
        if actual == Some(expected) {
            return Ok(());
        }
        Err(ScenarioError::UnexpectedBody {
            step,
            field,
            expected: expected.to_string(),
            actual: actual.unwrap_or("<missing>").to_string(),
        })
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs catalog scenarios against one account service.
#[derive(Clone)]
pub struct ScenarioRunner {
    /// Account operations shared by all scenarios (stateless).
    client: AccountClient,
    /// Harness configuration.
    config: Arc<HarnessConfig>,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
}

impl ScenarioRunner {
    /// Builds a runner over an existing client.
    #[must_use]
    pub fn new(client: AccountClient, config: HarnessConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            client,
            config: Arc::new(config),
            audit,
        }
    }

    /// Builds a runner with a reqwest transport for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Setup`] when the HTTP client cannot be built.
    pub fn from_config(
        config: HarnessConfig,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.base_url.clone(), config.timeout)?;
        Ok(Self::new(AccountClient::new(Arc::new(transport)), config, audit))
    }

    /// Runs one scenario to completion.
    pub async fn run_one(&self, kind: ScenarioKind) -> ScenarioOutcome {
        let name = kind.name();
        let ctx = ScenarioContext::new(
            name,
            self.client.clone(),
            Arc::clone(&self.config),
            Arc::clone(&self.audit),
        );
        self.audit.record(
            &AuditEvent::new(AuditEventKind::ScenarioStarted, name)
                .with_detail(format!("username {}", ctx.credentials().username)),
        );
        let started = Instant::now();
        let result = kind.run(&ctx).await;
        let duration_ms = duration_millis(started.elapsed());

        let (status, failure) = match result {
            Ok(()) => (ScenarioStatus::Passed, None),
            Err(err) => {
                let status = match &err {
                    ScenarioError::UnexpectedStatus {
                        actual, ..
                    } => Some(*actual),
                    _ => None,
                };
                self.audit.record(
                    &AuditEvent::new(AuditEventKind::StepFailed, name)
                        .with_step(err.step())
                        .with_status(status)
                        .with_detail(err.to_string()),
                );
                (ScenarioStatus::Failed, Some(FailureReport::from_error(&err)))
            }
        };
        self.audit.record(
            &AuditEvent::new(AuditEventKind::ScenarioFinished, name)
                .with_detail(status.as_str()),
        );
        ScenarioOutcome {
            name: name.to_string(),
            username: ctx.credentials().username.clone(),
            status,
            steps: ctx.steps(),
            failure,
            duration_ms,
        }
    }

    /// Runs scenarios with at most `parallelism` in flight. Outcomes keep the
    /// order of `kinds`.
    pub async fn run_all(&self, kinds: &[ScenarioKind]) -> RunReport {
        let started_at_ms = now_millis();
        let started = Instant::now();
        let limit = self.config.parallelism.max(1);
        let mut outcomes: Vec<Option<ScenarioOutcome>> = vec![None; kinds.len()];
        let mut pending = kinds.iter().copied().enumerate();
        let mut tasks = JoinSet::new();

        loop {
            while tasks.len() < limit {
                let Some((index, kind)) = pending.next() else {
                    break;
                };
                let runner = self.clone();
                tasks.spawn(async move { (index, runner.run_one(kind).await) });
            }
            let Some(joined) = tasks.join_next().await else {
                break;
            };
            if let Ok((index, outcome)) = joined
                && let Some(slot) = outcomes.get_mut(index)
            {
                *slot = Some(outcome);
            }
        }

        let outcomes = kinds
            .iter()
            .zip(outcomes)
            .map(|(kind, outcome)| outcome.unwrap_or_else(|| ScenarioOutcome::aborted(kind.name())))
            .collect();
        RunReport::new(
            self.config.base_url.clone(),
            started_at_ms,
            duration_millis(started.elapsed()),
            outcomes,
        )
    }
}
