// crates/account-contract-core/src/lib.rs
// ============================================================================
// Module: Account Contract Library
// Description: Contract test harness for a remote user-account HTTP service.
// Purpose: Drive signup, token, login, lookup and delete and assert responses.
// Dependencies: async-trait, reqwest, serde, serde_jcs, thiserror, tokio, toml, url
// ============================================================================

//! ## Overview
//! The harness treats a user-account service as a black box and checks its
//! observable contract. It is layered bottom-up:
//! - [`transport`]: one request in, one `(status, body)` out, behind the
//!   [`HttpTransport`] seam.
//! - [`account`]: typed signup, token, login, lookup and delete calls.
//! - [`lifecycle`]: typestate chain `create -> token -> verify -> delete`.
//! - [`scenario`] and [`catalog`]: isolated scenarios and their runner.
//! - [`report`] and [`audit`]: run summaries and JSON-line progress logs.
//!
//! Invariants:
//! - Every scenario owns fresh credentials; no mutable state crosses scenarios.
//! - A transport failure is never reported as a contract mismatch.
//! - Passwords and tokens never appear in logs or reports.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod account;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod contract;
pub mod lifecycle;
pub mod report;
pub mod scenario;
pub mod transport;

#[cfg(test)]
mod test_support;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use account::Account;
pub use account::AccountClient;
pub use account::CreateOutcome;
pub use account::Credentials;
pub use account::SessionToken;
pub use audit::AuditEvent;
pub use audit::AuditEventKind;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use catalog::ScenarioKind;
pub use catalog::UnknownScenario;
pub use config::ConfigError;
pub use config::HarnessConfig;
pub use report::RunReport;
pub use report::ScenarioOutcome;
pub use report::ScenarioStatus;
pub use scenario::LifecycleState;
pub use scenario::ScenarioContext;
pub use scenario::ScenarioError;
pub use scenario::ScenarioRunner;
pub use scenario::StatusExpectation;
pub use transport::HttpMethod;
pub use transport::HttpRequest;
pub use transport::HttpResponse;
pub use transport::HttpTransport;
pub use transport::ReqwestTransport;
pub use transport::TransportError;
