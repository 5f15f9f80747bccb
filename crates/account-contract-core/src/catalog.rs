// crates/account-contract-core/src/catalog.rs
// ============================================================================
// Module: Scenario Catalog
// Description: The built-in account contract scenarios.
// Purpose: Name every scenario and bind it to its step sequence.
// Dependencies: crate::{account, contract, lifecycle, scenario, transport}
// ============================================================================

//! ## Overview
//! Every scenario is self-sufficient: it mints its own account from the
//! context's fresh credentials and removes it afterwards when cleanup is on.
//! No scenario relies on another having run first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::account::CreateOutcome;
use crate::contract;
use crate::lifecycle;
use crate::lifecycle::steps;
use crate::scenario::ScenarioContext;
use crate::scenario::ScenarioError;
use crate::scenario::StatusExpectation;
use crate::transport::HttpMethod;

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Built-in scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    /// Login endpoint answers something other than 404.
    AuthorizedEndpointExists,
    /// User-by-id endpoint answers something other than 404.
    UserEndpointExists,
    /// Second signup with the same username reports "already exists".
    SignupIdempotent,
    /// Correct credentials authenticate.
    LoginSucceeds,
    /// Unknown username is rejected.
    LoginWrongUsername,
    /// Wrong password is rejected.
    LoginWrongPassword,
    /// Lookup echoes the created id.
    VerifyExistingUser,
    /// Lookup with a tampered token is unauthorized.
    VerifyTamperedToken,
    /// Lookup with a tampered id is not found.
    VerifyMalformedId,
    /// Delete succeeds and the account is gone afterwards.
    DeleteExistingUser,
    /// Delete with a tampered id is rejected.
    DeleteMalformedId,
    /// Delete with a tampered token is rejected.
    DeleteTamperedToken,
}

impl ScenarioKind {
    /// Every scenario, in reporting order.
    pub const ALL: [Self; 12] = [
        Self::AuthorizedEndpointExists,
        Self::UserEndpointExists,
        Self::SignupIdempotent,
        Self::LoginSucceeds,
        Self::LoginWrongUsername,
        Self::LoginWrongPassword,
        Self::VerifyExistingUser,
        Self::VerifyTamperedToken,
        Self::VerifyMalformedId,
        Self::DeleteExistingUser,
        Self::DeleteMalformedId,
        Self::DeleteTamperedToken,
    ];

    /// Stable kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AuthorizedEndpointExists => "authorized-endpoint-exists",
            Self::UserEndpointExists => "user-endpoint-exists",
            Self::SignupIdempotent => "signup-idempotent",
            Self::LoginSucceeds => "login-succeeds",
            Self::LoginWrongUsername => "login-wrong-username",
            Self::LoginWrongPassword => "login-wrong-password",
            Self::VerifyExistingUser => "verify-existing-user",
            Self::VerifyTamperedToken => "verify-tampered-token",
            Self::VerifyMalformedId => "verify-malformed-id",
            Self::DeleteExistingUser => "delete-existing-user",
            Self::DeleteMalformedId => "delete-malformed-id",
            Self::DeleteTamperedToken => "delete-tampered-token",
        }
    }

    /// One-line description for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthorizedEndpointExists => "POST /Account/v1/Authorized is routed (not 404)",
            Self::UserEndpointExists => "POST /Account/v1/User/{UUID} is routed (not 404)",
            Self::SignupIdempotent => "signup twice: 201, then 200 or 406",
            Self::LoginSucceeds => "create, token, authorized -> 200 true",
            Self::LoginWrongUsername => "unknown username -> 404 / 1207 / User not found!",
            Self::LoginWrongPassword => "wrong password -> 404 / 1207 / User not found!",
            Self::VerifyExistingUser => "create, token, lookup -> 200 with same id",
            Self::VerifyTamperedToken => "lookup with tampered token -> 401 User not authorized!",
            Self::VerifyMalformedId => "lookup with tampered id -> 401 User not found!",
            Self::DeleteExistingUser => "delete -> 204, then lookup -> User not found!",
            Self::DeleteMalformedId => "delete with tampered id -> 1207 User Id not correct!",
            Self::DeleteTamperedToken => "delete with tampered token -> 1200 User not authorized!",
        }
    }

    /// Runs the scenario's steps.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScenarioError`] encountered.
    pub async fn run(self, ctx: &ScenarioContext) -> Result<(), ScenarioError> {
        match self {
            Self::AuthorizedEndpointExists => probe(ctx, contract::AUTHORIZED_PATH).await,
            Self::UserEndpointExists => probe(ctx, contract::USER_TEMPLATE_PATH).await,
            Self::SignupIdempotent => signup_idempotent(ctx).await,
            Self::LoginSucceeds => {
                let tokened = lifecycle::create(ctx).await?.issue_token().await?;
                let result = tokened.authenticate().await;
                tokened.cleanup().await;
                result
            }
            Self::LoginWrongUsername => {
                lifecycle::expect_login_rejected(ctx, ctx.credentials()).await
            }
            Self::LoginWrongPassword => {
                let tokened = lifecycle::create(ctx).await?.issue_token().await?;
                let result = tokened.authenticate_with_wrong_password().await;
                tokened.cleanup().await;
                result
            }
            Self::VerifyExistingUser => {
                let verified = lifecycle::create(ctx).await?.issue_token().await?.verify().await?;
                verified.cleanup().await;
                Ok(())
            }
            Self::VerifyTamperedToken => {
                let tokened = lifecycle::create(ctx).await?.issue_token().await?;
                let result = tokened.verify_with_tampered_token().await;
                tokened.cleanup().await;
                result
            }
            Self::VerifyMalformedId => {
                let tokened = lifecycle::create(ctx).await?.issue_token().await?;
                let result = tokened.verify_with_malformed_id().await;
                tokened.cleanup().await;
                result
            }
            Self::DeleteExistingUser => {
                let verified = lifecycle::create(ctx).await?.issue_token().await?.verify().await?;
                verified.delete().await?.verify_absent().await?;
                Ok(())
            }
            Self::DeleteMalformedId => {
                let tokened = lifecycle::create(ctx).await?.issue_token().await?;
                let result = tokened.delete_with_malformed_id().await;
                tokened.cleanup().await;
                result
            }
            Self::DeleteTamperedToken => {
                let tokened = lifecycle::create(ctx).await?.issue_token().await?;
                let result = tokened.delete_with_tampered_token().await;
                tokened.cleanup().await;
                result
            }
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown scenario name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scenario: {0}")]
pub struct UnknownScenario(pub String);

impl FromStr for ScenarioKind {
    type Err = UnknownScenario;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == raw)
            .ok_or_else(|| UnknownScenario(raw.to_string()))
    }
}

// ============================================================================
// SECTION: Scenario Bodies
// ============================================================================

/// POSTs `{}` to `path`; any status but 404 passes.
async fn probe(ctx: &ScenarioContext, path: &str) -> Result<(), ScenarioError> {
    let response = ctx
        .client()
        .probe(HttpMethod::Post, path)
        .await
        .map_err(ScenarioError::transport(steps::PROBE))?;
    ctx.expect_status(
        steps::PROBE,
        StatusExpectation::Not(contract::STATUS_NOT_FOUND),
        response.status,
        &response.body,
    )?;
    ctx.pass(steps::PROBE, None, Some(response.status));
    Ok(())
}

/// Signs the same username up twice.
async fn signup_idempotent(ctx: &ScenarioContext) -> Result<(), ScenarioError> {
    let created = lifecycle::create(ctx).await?;
    let second = ctx
        .client()
        .create(ctx.credentials())
        .await
        .map_err(ScenarioError::transport(steps::CREATE_AGAIN));
    let result = second.and_then(|outcome| match outcome {
        CreateOutcome::AlreadyExists(response) => {
            ctx.pass(steps::CREATE_AGAIN, None, Some(response.status));
            Ok(())
        }
        CreateOutcome::Created(_) => Err(ScenarioError::UnexpectedStatus {
            step: steps::CREATE_AGAIN,
            expected: ALREADY_EXISTS.to_string(),
            actual: contract::STATUS_CREATED,
            body: serde_json::Value::Null,
        }),
        CreateOutcome::Unexpected(response) => Err(ScenarioError::UnexpectedStatus {
            step: steps::CREATE_AGAIN,
            expected: ALREADY_EXISTS.to_string(),
            actual: response.status,
            body: response.body,
        }),
    });
    created.cleanup().await;
    result
}

/// Statuses that mean "username already registered".
const ALREADY_EXISTS: StatusExpectation =
    StatusExpectation::AnyOf(&[contract::STATUS_OK, contract::STATUS_ALREADY_EXISTS]);
