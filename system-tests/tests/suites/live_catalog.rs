// system-tests/tests/suites/live_catalog.rs
// ============================================================================
// Module: Live Catalog Tests
// Description: Runs the scenario catalog against the configured service.
// Purpose: Confirm the remote service still honors the account contract.
// Dependencies: account-contract-core, system-tests, tokio
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::sync::Arc;

use account_contract_core::AccountClient;
use account_contract_core::Credentials;
use account_contract_core::FileAuditSink;
use account_contract_core::NoopAuditSink;
use account_contract_core::ReqwestTransport;
use account_contract_core::ScenarioKind;
use account_contract_core::ScenarioRunner;
use account_contract_core::contract;
use system_tests::config::SystemTestConfig;

use crate::helpers::artifacts::TestArtifacts;

#[tokio::test(flavor = "multi_thread")]
async fn live_catalog_passes() {
    let system = SystemTestConfig::load().expect("system test config");
    let harness = system.harness().expect("harness config");
    let artifacts = TestArtifacts::new(&system, "live_catalog_passes").expect("artifacts");
    let audit = FileAuditSink::new(&artifacts.root().join("audit.jsonl")).expect("audit log");
    let runner = ScenarioRunner::from_config(harness, Arc::new(audit)).expect("runner");

    let report = runner.run_all(&ScenarioKind::ALL).await;
    artifacts.write_run("live_catalog_passes", &report).expect("write artifacts");
    assert!(report.all_passed(), "{}", report.to_markdown());
}

#[tokio::test(flavor = "multi_thread")]
async fn live_deleted_account_can_no_longer_log_in() {
    let system = SystemTestConfig::load().expect("system test config");
    let harness = system.harness().expect("harness config");
    let password = harness.password.clone();
    let transport =
        ReqwestTransport::new(harness.base_url.clone(), harness.timeout).expect("transport");
    let runner = ScenarioRunner::from_config(harness, Arc::new(NoopAuditSink)).expect("runner");

    let outcome = runner.run_one(ScenarioKind::DeleteExistingUser).await;
    assert!(outcome.passed(), "{:?}", outcome.failure);

    let client = AccountClient::new(Arc::new(transport));
    let login = client
        .authenticate(&Credentials::new(outcome.username, password))
        .await
        .expect("login check");
    assert_eq!(login.status, contract::STATUS_NOT_FOUND);
    assert_eq!(login.message.as_deref(), Some(contract::MSG_USER_NOT_FOUND));
}
