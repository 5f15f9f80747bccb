// crates/account-contract-core/src/account.rs
// ============================================================================
// Module: Account Lifecycle Helper
// Description: Semantic account operations mapped onto single HTTP calls.
// Purpose: Give scenarios typed create/token/login/verify/delete calls.
// Dependencies: rand, serde, serde_json, crate::transport
// ============================================================================

//! ## Overview
//! Each [`AccountClient`] operation issues exactly one request through the
//! configured [`HttpTransport`] and decodes whatever came back into a typed
//! result. Nothing here retries, caches, or judges the outcome: a 401 is a
//! perfectly good [`VerificationResult`]. Deciding what was expected is the
//! scenario runner's job.
//!
//! Security posture: passwords and tokens are redacted from `Debug` output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::contract;
use crate::transport::HttpMethod;
use crate::transport::HttpRequest;
use crate::transport::HttpResponse;
use crate::transport::HttpTransport;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exclusive upper bound of the random suffix used for generated usernames.
const USERNAME_SUFFIX_BOUND: u64 = 10_000_000_000;

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Username/password pair, serialized the way the signup endpoint expects.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account username.
    #[serde(rename = "userName")]
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Builds credentials from explicit values.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Generates credentials with a random username `<prefix><number>`.
    #[must_use]
    pub fn generate(prefix: &str, password: &str) -> Self {
        let suffix = rand::thread_rng().gen_range(0..USERNAME_SUFFIX_BOUND);
        Self::new(format!("{prefix}{suffix}"), password)
    }

    /// Returns a copy with a different password.
    #[must_use]
    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self::new(self.username.clone(), password)
    }

    /// Returns the JSON payload sent to signup, token, and login endpoints.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        json!({
            "userName": self.username,
            "password": self.password,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// SECTION: Account + Token
// ============================================================================

/// Account identity returned by signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Service-assigned user id.
    #[serde(rename = "userID")]
    pub user_id: String,
    /// Username echoed back by the service.
    pub username: String,
}

/// Opaque bearer token issued for one credential pair.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a token with `suffix` appended, which the service must reject.
    #[must_use]
    pub fn tampered(&self, suffix: &str) -> Self {
        Self(format!("{}{suffix}", self.0))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.0.len())
    }
}

// ============================================================================
// SECTION: Operation Results
// ============================================================================

/// Signup outcome.
///
/// # Invariants
/// - `Created` only for status 201 with a decodable account payload.
/// - `AlreadyExists` for 200 and 406; both mean the username is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new account was created.
    Created(Account),
    /// The username was already registered.
    AlreadyExists(HttpResponse),
    /// Any other response, including a 201 without an account payload.
    Unexpected(HttpResponse),
}

impl CreateOutcome {
    /// Classifies a signup response.
    #[must_use]
    pub fn from_response(response: HttpResponse) -> Self {
        match response.status {
            contract::STATUS_CREATED => serde_json::from_value::<Account>(response.body.clone())
                .map_or(Self::Unexpected(response), Self::Created),
            contract::STATUS_OK | contract::STATUS_ALREADY_EXISTS => Self::AlreadyExists(response),
            _ => Self::Unexpected(response),
        }
    }

    /// Returns the HTTP status behind the outcome.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Created(_) => contract::STATUS_CREATED,
            Self::AlreadyExists(response) | Self::Unexpected(response) => response.status,
        }
    }

    /// Returns a stable label for reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::AlreadyExists(_) => "already_exists",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

/// Token endpoint result. The raw body is not retained so tokens stay out of
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResult {
    /// HTTP status.
    pub status: u16,
    /// Issued token when present and non-empty.
    pub token: Option<SessionToken>,
    /// `status` field of the body (`Success` / `Failed`).
    pub outcome: Option<String>,
    /// `result` field of the body.
    pub message: Option<String>,
}

impl TokenResult {
    /// Decodes a token response.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            token: response.str_field("token").filter(|raw| !raw.is_empty()).map(SessionToken::new),
            outcome: response.str_field("status").map(str::to_string),
            message: response.str_field("result").map(str::to_string),
        }
    }
}

/// Login check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResult {
    /// HTTP status.
    pub status: u16,
    /// Boolean body when the service returned one.
    pub authorized: Option<bool>,
    /// `code` field of an error body.
    pub error_code: Option<String>,
    /// `message` field of an error body.
    pub message: Option<String>,
    /// Raw body.
    pub body: Value,
}

impl AuthorizationResult {
    /// Decodes a login response.
    #[must_use]
    pub fn from_response(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            authorized: response.body.as_bool(),
            error_code: response.str_field("code").map(str::to_string),
            message: response.str_field("message").map(str::to_string),
            body: response.body,
        }
    }
}

/// Lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// HTTP status.
    pub status: u16,
    /// `userId` echoed by a successful lookup.
    pub user_id: Option<String>,
    /// `message` field of an error body.
    pub message: Option<String>,
    /// `code` field of an error body.
    pub error_code: Option<String>,
    /// Raw body.
    pub body: Value,
}

impl VerificationResult {
    /// Decodes a lookup response.
    #[must_use]
    pub fn from_response(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            user_id: response.str_field("userId").map(str::to_string),
            message: response.str_field("message").map(str::to_string),
            error_code: response.str_field("code").map(str::to_string),
            body: response.body,
        }
    }
}

/// Delete result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionResult {
    /// HTTP status.
    pub status: u16,
    /// `code` field of an error body.
    pub error_code: Option<String>,
    /// `message` field of an error body.
    pub message: Option<String>,
    /// Raw body; `Value::Null` on a clean 204.
    pub body: Value,
}

impl DeletionResult {
    /// Decodes a delete response.
    #[must_use]
    pub fn from_response(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            error_code: response.str_field("code").map(str::to_string),
            message: response.str_field("message").map(str::to_string),
            body: response.body,
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Account lifecycle operations over a shared transport.
#[derive(Clone)]
pub struct AccountClient {
    /// Transport used for every call.
    transport: Arc<dyn HttpTransport>,
}

impl AccountClient {
    /// Builds a client over the transport.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
        }
    }

    /// Registers an account.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received.
    pub async fn create(&self, credentials: &Credentials) -> Result<CreateOutcome, TransportError> {
        let request =
            HttpRequest::new(HttpMethod::Post, contract::USER_PATH).with_json(credentials.to_payload());
        let response = self.transport.send(request).await?;
        Ok(CreateOutcome::from_response(response))
    }

    /// Requests a session token for the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received.
    pub async fn issue_token(&self, credentials: &Credentials) -> Result<TokenResult, TransportError> {
        let request = HttpRequest::new(HttpMethod::Post, contract::GENERATE_TOKEN_PATH)
            .with_json(credentials.to_payload());
        let response = self.transport.send(request).await?;
        Ok(TokenResult::from_response(&response))
    }

    /// Asks whether the credentials are authorized.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthorizationResult, TransportError> {
        let request = HttpRequest::new(HttpMethod::Post, contract::AUTHORIZED_PATH)
            .with_json(credentials.to_payload());
        let response = self.transport.send(request).await?;
        Ok(AuthorizationResult::from_response(response))
    }

    /// Looks an account up by id.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received.
    pub async fn verify(
        &self,
        user_id: &str,
        token: &SessionToken,
    ) -> Result<VerificationResult, TransportError> {
        let request = HttpRequest::new(HttpMethod::Get, contract::user_path(user_id))
            .with_bearer(token.as_str());
        let response = self.transport.send(request).await?;
        Ok(VerificationResult::from_response(response))
    }

    /// Deletes an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received.
    pub async fn delete(
        &self,
        user_id: &str,
        token: &SessionToken,
    ) -> Result<DeletionResult, TransportError> {
        let request = HttpRequest::new(HttpMethod::Delete, contract::user_path(user_id))
            .with_bearer(token.as_str());
        let response = self.transport.send(request).await?;
        Ok(DeletionResult::from_response(response))
    }

    /// Sends an empty JSON object to a path and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received.
    pub async fn probe(&self, method: HttpMethod, path: &str) -> Result<HttpResponse, TransportError> {
        let request = HttpRequest::new(method, path).with_json(json!({}));
        self.transport.send(request).await
    }
}
