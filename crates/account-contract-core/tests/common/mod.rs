// crates/account-contract-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: In-process fake of the account service plus test sinks.
// Purpose: Exercise the harness over real HTTP without a remote service.
// Dependencies: account-contract-core, axum, tokio
// ============================================================================

//! ## Overview
//! [`FakeAccountService`] serves the account contract on a loopback port,
//! including its quirks: lookups of unknown ids answer 401 with
//! "User not found!", deletes of unknown ids answer 200 with code 1207, and
//! tokens stay valid after their account is deleted. A [`Fault`] makes one
//! endpoint misbehave so failure isolation can be checked.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only helpers; not every suite uses every helper."
)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use account_contract_core::AuditEvent;
use account_contract_core::AuditEventKind;
use account_contract_core::AuditSink;
use account_contract_core::HarnessConfig;
use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;
use tokio::sync::oneshot;

// ============================================================================
// SECTION: Faults
// ============================================================================

/// Deliberate contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Behave like the real service.
    None,
    /// Lookups echo a different user id.
    LookupEchoesWrongId,
    /// Repeated signups answer 201 again.
    SignupAlwaysCreated,
    /// Login checks always answer 200 false.
    LoginAlwaysFalse,
    /// Lookups accept any bearer token.
    LookupAcceptsAnyToken,
    /// Deletes of unknown ids answer 204.
    DeleteIgnoresUnknownId,
}

// ============================================================================
// SECTION: Service State
// ============================================================================

#[derive(Debug, Clone)]
struct StoredUser {
    username: String,
    password: String,
}

#[derive(Default)]
struct Accounts {
    /// Accounts by user id.
    users: HashMap<String, StoredUser>,
    /// Issued tokens and the user id they were issued for.
    tokens: HashMap<String, String>,
    /// Monotonic id counter.
    next_id: u64,
    /// Total signups that created an account.
    created: u64,
}

impl Accounts {
    fn find_by_credentials(&self, username: &str, password: &str) -> Option<String> {
        self.users
            .iter()
            .find(|(_, user)| user.username == username && user.password == password)
            .map(|(id, _)| id.clone())
    }
}

struct ServiceState {
    fault: Fault,
    accounts: Mutex<Accounts>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({"code": code, "message": message}))).into_response()
}

fn credentials(body: &Value) -> Option<(String, String)> {
    let username = body.get("userName")?.as_str()?.to_string();
    let password = body.get("password")?.as_str()?.to_string();
    Some((username, password))
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn signup(State(state): State<Arc<ServiceState>>, Json(body): Json<Value>) -> Response {
    let Some((username, password)) = credentials(&body) else {
        return error_body(StatusCode::BAD_REQUEST, "1200", "UserName and Password required.");
    };
    let mut accounts = state.accounts.lock().unwrap();
    let exists = accounts.users.values().any(|user| user.username == username);
    if exists && state.fault != Fault::SignupAlwaysCreated {
        return error_body(StatusCode::NOT_ACCEPTABLE, "1204", "User exists!");
    }
    accounts.next_id += 1;
    accounts.created += 1;
    let user_id = format!("{:08x}-fake-{}", accounts.next_id, accounts.next_id);
    accounts.users.insert(
        user_id.clone(),
        StoredUser {
            username: username.clone(),
            password,
        },
    );
    (StatusCode::CREATED, Json(json!({"userID": user_id, "username": username, "books": []})))
        .into_response()
}

async fn generate_token(State(state): State<Arc<ServiceState>>, Json(body): Json<Value>) -> Response {
    let Some((username, password)) = credentials(&body) else {
        return error_body(StatusCode::BAD_REQUEST, "1200", "UserName and Password required.");
    };
    let mut accounts = state.accounts.lock().unwrap();
    let Some(user_id) = accounts.find_by_credentials(&username, &password) else {
        return Json(json!({
            "token": null,
            "expires": null,
            "status": "Failed",
            "result": "User authorization failed."
        }))
        .into_response();
    };
    let token = format!("token-{user_id}-{}", accounts.tokens.len());
    accounts.tokens.insert(token.clone(), user_id);
    Json(json!({
        "token": token,
        "expires": "2099-01-01T00:00:00.000Z",
        "status": "Success",
        "result": "User authorized successfully."
    }))
    .into_response()
}

async fn authorized(State(state): State<Arc<ServiceState>>, Json(body): Json<Value>) -> Response {
    let Some((username, password)) = credentials(&body) else {
        return error_body(StatusCode::BAD_REQUEST, "1200", "UserName and Password required.");
    };
    let accounts = state.accounts.lock().unwrap();
    match accounts.find_by_credentials(&username, &password) {
        Some(_) => Json(json!(state.fault != Fault::LoginAlwaysFalse)).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "1207", "User not found!"),
    }
}

async fn lookup(
    State(state): State<Arc<ServiceState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let accounts = state.accounts.lock().unwrap();
    let token = bearer(&headers);
    let owner = match token.as_ref().and_then(|token| accounts.tokens.get(token).cloned()) {
        Some(owner) => owner,
        None if token.is_some() && state.fault == Fault::LookupAcceptsAnyToken => user_id.clone(),
        None => return error_body(StatusCode::UNAUTHORIZED, "1200", "User not authorized!"),
    };
    let Some(user) = accounts.users.get(&user_id) else {
        return error_body(StatusCode::UNAUTHORIZED, "1207", "User not found!");
    };
    if owner != user_id {
        return error_body(StatusCode::UNAUTHORIZED, "1200", "User not authorized!");
    }
    let echoed = if state.fault == Fault::LookupEchoesWrongId {
        format!("{user_id}-other")
    } else {
        user_id
    };
    Json(json!({"userId": echoed, "username": user.username, "books": []})).into_response()
}

async fn remove(
    State(state): State<Arc<ServiceState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut accounts = state.accounts.lock().unwrap();
    let Some(owner) = bearer(&headers).and_then(|token| accounts.tokens.get(&token).cloned())
    else {
        return error_body(StatusCode::UNAUTHORIZED, "1200", "User not authorized!");
    };
    if !accounts.users.contains_key(&user_id) {
        if state.fault == Fault::DeleteIgnoresUnknownId {
            return StatusCode::NO_CONTENT.into_response();
        }
        return error_body(StatusCode::OK, "1207", "User Id not correct!");
    }
    if owner != user_id {
        return error_body(StatusCode::UNAUTHORIZED, "1200", "User not authorized!");
    }
    accounts.users.remove(&user_id);
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Running fake account service; stops when dropped.
pub struct FakeAccountService {
    /// Base URL of the loopback listener.
    pub base_url: String,
    state: Arc<ServiceState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeAccountService {
    /// Starts a well-behaved service.
    pub async fn spawn() -> Self {
        Self::spawn_with(Fault::None).await
    }

    /// Starts a service with one deliberate fault.
    pub async fn spawn_with(fault: Fault) -> Self {
        let state = Arc::new(ServiceState {
            fault,
            accounts: Mutex::new(Accounts::default()),
        });
        let app = Router::new()
            .route("/Account/v1/User", post(signup))
            .route("/Account/v1/GenerateToken", post(generate_token))
            .route("/Account/v1/Authorized", post(authorized))
            .route("/Account/v1/User/{id}", get(lookup).delete(remove))
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Accounts currently registered.
    pub fn live_accounts(&self) -> usize {
        self.state.accounts.lock().unwrap().users.len()
    }

    /// Accounts created over the service lifetime.
    pub fn created_accounts(&self) -> u64 {
        self.state.accounts.lock().unwrap().created
    }

    /// Whether an account with the username is registered.
    pub fn has_username(&self, username: &str) -> bool {
        self.state.accounts.lock().unwrap().users.values().any(|user| user.username == username)
    }

    /// Harness configuration pointed at this service.
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig {
            base_url: self.base_url.clone(),
            ..HarnessConfig::default()
        }
    }
}

impl Drop for FakeAccountService {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Base URL of a loopback port with nothing listening.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingSink {
    /// Events recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Number of events of one kind.
    pub fn count(&self, kind: AuditEventKind) -> usize {
        self.events.lock().unwrap().iter().filter(|event| event.event == kind).count()
    }
}

impl AuditSink for RecordingSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
