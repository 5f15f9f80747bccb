// crates/account-contract-core/src/lifecycle.rs
// ============================================================================
// Module: Account Lifecycle Steps
// Description: Typestate chain for create -> token -> verify -> delete.
// Purpose: Make out-of-order lifecycle calls unrepresentable.
// Dependencies: crate::{account, audit, contract, scenario}
// ============================================================================

//! ## Overview
//! Each lifecycle state is its own type and each transition consumes the
//! previous one:
//!
//! ```text
//! create -> Created -> issue_token -> Tokened -> verify -> Verified
//!        -> delete -> Deleted -> verify_absent
//! ```
//!
//! Edge-case probes (tampered token, malformed id, wrong password) borrow a
//! [`Tokened`] state and end the scenario. Accounts left behind are removed
//! with `cleanup`, which never fails the scenario.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::account::Account;
use crate::account::CreateOutcome;
use crate::account::Credentials;
use crate::account::SessionToken;
use crate::audit::AuditEvent;
use crate::audit::AuditEventKind;
use crate::contract;
use crate::scenario::LifecycleState;
use crate::scenario::ScenarioContext;
use crate::scenario::ScenarioError;
use crate::scenario::StatusExpectation;

// ============================================================================
// SECTION: Step Names
// ============================================================================

/// Step names recorded in reports.
pub mod steps {
    /// Signup.
    pub const CREATE: &str = "create";
    /// Second signup with the same username.
    pub const CREATE_AGAIN: &str = "create_again";
    /// Token issue.
    pub const ISSUE_TOKEN: &str = "issue_token";
    /// Login check.
    pub const AUTHENTICATE: &str = "authenticate";
    /// Lookup with valid id and token.
    pub const VERIFY: &str = "verify";
    /// Lookup with a tampered token.
    pub const VERIFY_TAMPERED_TOKEN: &str = "verify_tampered_token";
    /// Lookup with a tampered id.
    pub const VERIFY_MALFORMED_ID: &str = "verify_malformed_id";
    /// Delete with valid id and token.
    pub const DELETE: &str = "delete";
    /// Delete with a tampered id.
    pub const DELETE_MALFORMED_ID: &str = "delete_malformed_id";
    /// Delete with a tampered token.
    pub const DELETE_TAMPERED_TOKEN: &str = "delete_tampered_token";
    /// Lookup after delete.
    pub const VERIFY_ABSENT: &str = "verify_absent";
    /// Endpoint existence probe.
    pub const PROBE: &str = "probe";
}

// ============================================================================
// SECTION: Entry
// ============================================================================

/// Registers the scenario's account: `INIT -> CREATED`.
///
/// # Errors
///
/// Returns [`ScenarioError`] unless the service answered 201 with an account.
pub async fn create(ctx: &ScenarioContext) -> Result<Created<'_>, ScenarioError> {
    let credentials = ctx.credentials().clone();
    let outcome = ctx
        .client()
        .create(&credentials)
        .await
        .map_err(ScenarioError::transport(steps::CREATE))?;
    match outcome {
        CreateOutcome::Created(account) => {
            ctx.expect_field(
                steps::CREATE,
                "username",
                &credentials.username,
                Some(account.username.as_str()),
            )?;
            ctx.pass(steps::CREATE, Some(LifecycleState::Created), Some(contract::STATUS_CREATED));
            Ok(Created {
                ctx,
                credentials,
                account,
            })
        }
        CreateOutcome::AlreadyExists(response) | CreateOutcome::Unexpected(response) => {
            Err(ScenarioError::UnexpectedStatus {
                step: steps::CREATE,
                expected: StatusExpectation::Exactly(contract::STATUS_CREATED).to_string(),
                actual: response.status,
                body: response.body,
            })
        }
    }
}

// ============================================================================
// SECTION: States
// ============================================================================

/// Account registered, no token yet.
pub struct Created<'a> {
    /// Owning scenario.
    ctx: &'a ScenarioContext,
    /// Credentials used for signup.
    credentials: Credentials,
    /// Account returned by signup.
    account: Account,
}

impl<'a> Created<'a> {
    /// Requests a token: `CREATED -> TOKENED`. When no token is issued the
    /// account cannot be deleted, so the stranded account is audited.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the service answered 200 with a token.
    pub async fn issue_token(self) -> Result<Tokened<'a>, ScenarioError> {
        let requested = self.request_token().await;
        match requested {
            Ok((status, token)) => {
                self.ctx.pass(steps::ISSUE_TOKEN, Some(LifecycleState::Tokened), Some(status));
                Ok(self.into_tokened(token))
            }
            Err(err) => {
                if self.ctx.config().cleanup {
                    cleanup_failed(
                        self.ctx,
                        steps::ISSUE_TOKEN,
                        format!("account {} left behind: {err}", self.account.user_id),
                    );
                }
                Err(err)
            }
        }
    }

    /// Deletes the account when cleanup is enabled, fetching a token first.
    /// Nothing is recorded as a scenario step; failures are audited.
    pub async fn cleanup(self) {
        if !self.ctx.config().cleanup {
            return;
        }
        let requested = self.request_token().await;
        match requested {
            Ok((_, token)) => self.into_tokened(token).cleanup().await,
            Err(err) => cleanup_failed(self.ctx, steps::ISSUE_TOKEN, err.to_string()),
        }
    }

    /// Issues the token request and returns its status and token.
    async fn request_token(&self) -> Result<(u16, SessionToken), ScenarioError> {
        let step = steps::ISSUE_TOKEN;
        let result = self
            .ctx
            .client()
            .issue_token(&self.credentials)
            .await
            .map_err(ScenarioError::transport(step))?;
        self.ctx.expect_status(
            step,
            StatusExpectation::Exactly(contract::STATUS_OK),
            result.status,
            &serde_json::Value::Null,
        )?;
        let Some(token) = result.token else {
            return Err(ScenarioError::UnexpectedBody {
                step,
                field: "token",
                expected: "non-empty token".to_string(),
                actual: result.outcome.unwrap_or_else(|| "<missing>".to_string()),
            });
        };
        Ok((result.status, token))
    }

    fn into_tokened(self, token: SessionToken) -> Tokened<'a> {
        Tokened {
            ctx: self.ctx,
            credentials: self.credentials,
            account: self.account,
            token,
        }
    }
}

/// Account registered and holding a valid token.
pub struct Tokened<'a> {
    /// Owning scenario.
    ctx: &'a ScenarioContext,
    /// Credentials used for signup.
    credentials: Credentials,
    /// Account returned by signup.
    account: Account,
    /// Token issued for the credentials.
    token: SessionToken,
}

impl<'a> Tokened<'a> {
    /// Looks the account up with valid id and token: `TOKENED -> VERIFIED`.
    /// On failure the account is cleaned up before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the lookup answered 200 with the same id.
    pub async fn verify(self) -> Result<Verified<'a>, ScenarioError> {
        match self.check_lookup().await {
            Ok(status) => {
                self.ctx.pass(steps::VERIFY, Some(LifecycleState::Verified), Some(status));
                Ok(Verified {
                    inner: self,
                })
            }
            Err(err) => {
                self.cleanup().await;
                Err(err)
            }
        }
    }

    /// Issues the valid lookup and returns its status when it matches.
    async fn check_lookup(&self) -> Result<u16, ScenarioError> {
        let step = steps::VERIFY;
        let result = self
            .ctx
            .client()
            .verify(&self.account.user_id, &self.token)
            .await
            .map_err(ScenarioError::transport(step))?;
        self.ctx.expect_status(
            step,
            StatusExpectation::Exactly(contract::STATUS_OK),
            result.status,
            &result.body,
        )?;
        self.ctx.expect_field(step, "userId", &self.account.user_id, result.user_id.as_deref())?;
        Ok(result.status)
    }

    /// Login check with the scenario's own credentials; expects `true`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the service answered 200 with `true`.
    pub async fn authenticate(&self) -> Result<(), ScenarioError> {
        let step = steps::AUTHENTICATE;
        let result = self
            .ctx
            .client()
            .authenticate(&self.credentials)
            .await
            .map_err(ScenarioError::transport(step))?;
        self.ctx.expect_status(
            step,
            StatusExpectation::Exactly(contract::STATUS_OK),
            result.status,
            &result.body,
        )?;
        if result.authorized != Some(true) {
            return Err(ScenarioError::UnexpectedBody {
                step,
                field: "body",
                expected: "true".to_string(),
                actual: result.body.to_string(),
            });
        }
        self.ctx.pass(step, None, Some(result.status));
        Ok(())
    }

    /// Login check with the right username and a wrong password.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the service answered 404 / 1207 /
    /// "User not found!".
    pub async fn authenticate_with_wrong_password(&self) -> Result<(), ScenarioError> {
        let wrong = self.credentials.with_password(mutate_password(&self.credentials.password));
        expect_login_rejected(self.ctx, &wrong).await
    }

    /// Lookup with a tampered token.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the service answered 401 with
    /// "User not authorized!".
    pub async fn verify_with_tampered_token(&self) -> Result<(), ScenarioError> {
        let step = steps::VERIFY_TAMPERED_TOKEN;
        let token = self.token.tampered(contract::TOKEN_TAMPER_SUFFIX);
        let result = self
            .ctx
            .client()
            .verify(&self.account.user_id, &token)
            .await
            .map_err(ScenarioError::transport(step))?;
        self.ctx.expect_status(
            step,
            StatusExpectation::Exactly(contract::STATUS_UNAUTHORIZED),
            result.status,
            &result.body,
        )?;
        self.ctx.expect_field(
            step,
            "message",
            contract::MSG_USER_NOT_AUTHORIZED,
            result.message.as_deref(),
        )?;
        self.ctx.pass(step, None, Some(result.status));
        Ok(())
    }

    /// Lookup with a tampered id.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the service answered 401 with
    /// "User not found!".
    pub async fn verify_with_malformed_id(&self) -> Result<(), ScenarioError> {
        let step = steps::VERIFY_MALFORMED_ID;
        let user_id = format!("{}{}", self.account.user_id, contract::VERIFY_ID_TAMPER_SUFFIX);
        let result = self
            .ctx
            .client()
            .verify(&user_id, &self.token)
            .await
            .map_err(ScenarioError::transport(step))?;
        self.ctx.expect_status(
            step,
            StatusExpectation::Exactly(contract::STATUS_UNAUTHORIZED),
            result.status,
            &result.body,
        )?;
        self.ctx.expect_field(
            step,
            "message",
            contract::MSG_USER_NOT_FOUND,
            result.message.as_deref(),
        )?;
        self.ctx.pass(step, None, Some(result.status));
        Ok(())
    }

    /// Delete with a tampered id. The status is not asserted.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the body carried code 1207 and
    /// "User Id not correct!".
    pub async fn delete_with_malformed_id(&self) -> Result<(), ScenarioError> {
        let step = steps::DELETE_MALFORMED_ID;
        let user_id = format!("{}{}", self.account.user_id, contract::DELETE_ID_TAMPER_SUFFIX);
        let result = self
            .ctx
            .client()
            .delete(&user_id, &self.token)
            .await
            .map_err(ScenarioError::transport(step))?;
        self.ctx.expect_field(step, "code", contract::CODE_NOT_FOUND, result.error_code.as_deref())?;
        self.ctx.expect_field(
            step,
            "message",
            contract::MSG_USER_ID_NOT_CORRECT,
            result.message.as_deref(),
        )?;
        self.ctx.pass(step, None, Some(result.status));
        Ok(())
    }

    /// Delete with a tampered token. The status is not asserted.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the body carried code 1200 and
    /// "User not authorized!".
    pub async fn delete_with_tampered_token(&self) -> Result<(), ScenarioError> {
        let step = steps::DELETE_TAMPERED_TOKEN;
        let token = self.token.tampered(contract::TOKEN_TAMPER_SUFFIX);
        let result = self
            .ctx
            .client()
            .delete(&self.account.user_id, &token)
            .await
            .map_err(ScenarioError::transport(step))?;
        self.ctx.expect_field(
            step,
            "code",
            contract::CODE_NOT_AUTHORIZED,
            result.error_code.as_deref(),
        )?;
        self.ctx.expect_field(
            step,
            "message",
            contract::MSG_USER_NOT_AUTHORIZED,
            result.message.as_deref(),
        )?;
        self.ctx.pass(step, None, Some(result.status));
        Ok(())
    }

    /// Deletes the account when cleanup is enabled. Failures are audited
    /// and otherwise ignored.
    pub async fn cleanup(self) {
        if !self.ctx.config().cleanup {
            return;
        }
        let detail = match self.ctx.client().delete(&self.account.user_id, &self.token).await {
            Ok(result) if result.status == contract::STATUS_NO_CONTENT => return,
            Ok(result) => format!("delete returned status {}", result.status),
            Err(err) => err.to_string(),
        };
        cleanup_failed(self.ctx, steps::DELETE, detail);
    }
}

/// Lookup confirmed the account.
pub struct Verified<'a> {
    /// Previous state; the token is still valid.
    inner: Tokened<'a>,
}

impl<'a> Verified<'a> {
    /// Deletes the account: `VERIFIED -> DELETED`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the service answered 204 with no body.
    pub async fn delete(self) -> Result<Deleted<'a>, ScenarioError> {
        let step = steps::DELETE;
        let Tokened {
            ctx,
            account,
            token,
            ..
        } = self.inner;
        let result =
            ctx.client().delete(&account.user_id, &token).await.map_err(ScenarioError::transport(step))?;
        ctx.expect_status(
            step,
            StatusExpectation::Exactly(contract::STATUS_NO_CONTENT),
            result.status,
            &result.body,
        )?;
        if !result.body.is_null() {
            return Err(ScenarioError::UnexpectedBody {
                step,
                field: "body",
                expected: "empty".to_string(),
                actual: result.body.to_string(),
            });
        }
        ctx.pass(step, Some(LifecycleState::Deleted), Some(result.status));
        Ok(Deleted {
            ctx,
            account,
            token,
        })
    }

    /// Deletes the account best-effort.
    pub async fn cleanup(self) {
        self.inner.cleanup().await;
    }
}

/// Account deleted; only the absence check remains.
pub struct Deleted<'a> {
    /// Owning scenario.
    ctx: &'a ScenarioContext,
    /// Deleted account.
    account: Account,
    /// Token issued before deletion.
    token: SessionToken,
}

impl Deleted<'_> {
    /// Looks the deleted account up: `DELETED -> VERIFIED_ABSENT`. Only the
    /// message is asserted.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] unless the body said "User not found!".
    pub async fn verify_absent(self) -> Result<Account, ScenarioError> {
        let step = steps::VERIFY_ABSENT;
        let result = self
            .ctx
            .client()
            .verify(&self.account.user_id, &self.token)
            .await
            .map_err(ScenarioError::transport(step))?;
        self.ctx.expect_field(
            step,
            "message",
            contract::MSG_USER_NOT_FOUND,
            result.message.as_deref(),
        )?;
        self.ctx.pass(step, Some(LifecycleState::VerifiedAbsent), Some(result.status));
        Ok(self.account)
    }
}

// ============================================================================
// SECTION: Free Steps
// ============================================================================

/// Login check that the service must reject with 404 / 1207 / "User not found!".
///
/// # Errors
///
/// Returns [`ScenarioError`] when the rejection differs from the observed contract.
pub async fn expect_login_rejected(
    ctx: &ScenarioContext,
    credentials: &Credentials,
) -> Result<(), ScenarioError> {
    let step = steps::AUTHENTICATE;
    let result =
        ctx.client().authenticate(credentials).await.map_err(ScenarioError::transport(step))?;
    ctx.expect_status(
        step,
        StatusExpectation::Exactly(contract::STATUS_NOT_FOUND),
        result.status,
        &result.body,
    )?;
    ctx.expect_field(step, "code", contract::CODE_NOT_FOUND, result.error_code.as_deref())?;
    ctx.expect_field(step, "message", contract::MSG_USER_NOT_FOUND, result.message.as_deref())?;
    ctx.pass(step, None, Some(result.status));
    Ok(())
}

/// Audits an account the scenario could not remove.
fn cleanup_failed(ctx: &ScenarioContext, step: &str, detail: String) {
    ctx.audit(
        &AuditEvent::new(AuditEventKind::CleanupFailed, ctx.name())
            .with_step(step)
            .with_detail(detail),
    );
}

/// Returns a password that differs from `password` only in its last character.
#[must_use]
pub fn mutate_password(password: &str) -> String {
    let mut chars: Vec<char> = password.chars().collect();
    match chars.last_mut() {
        Some(last) => *last = if *last == '&' { '#' } else { '&' },
        None => chars.push('&'),
    }
    chars.into_iter().collect()
}
