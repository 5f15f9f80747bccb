// crates/account-contract-core/src/test_support.rs
// ============================================================================
// Module: Unit Test Support
// Description: Scripted transport and recording audit sink for unit tests.
// Dependencies: async-trait, crate::{audit, transport}
// ============================================================================

#![allow(clippy::unwrap_used, reason = "Test-only helpers.")]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::audit::AuditEvent;
use crate::audit::AuditEventKind;
use crate::audit::AuditSink;
use crate::transport::HttpRequest;
use crate::transport::HttpResponse;
use crate::transport::HttpTransport;
use crate::transport::TransportError;

/// One scripted reply, computed from the request it answers.
pub(crate) type Reply = Box<dyn FnOnce(&HttpRequest) -> Result<HttpResponse, TransportError> + Send>;

/// Transport that replays scripted replies in order and records requests.
/// An exhausted script answers with a transport error.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    /// Remaining replies.
    replies: Mutex<VecDeque<Reply>>,
    /// Requests seen so far.
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Builds a transport that answers with `responses`.
    pub(crate) fn with(responses: Vec<HttpResponse>) -> Arc<Self> {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Builds a transport that answers with responses or transport errors.
    pub(crate) fn with_results(results: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        Self::with_replies(results.into_iter().map(fixed).collect())
    }

    /// Builds a transport from arbitrary replies.
    pub(crate) fn with_replies(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Requests seen so far.
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = self.replies.lock().unwrap().pop_front();
        let result = match reply {
            Some(reply) => reply(&request),
            None => Err(TransportError::Io("script exhausted".to_string())),
        };
        self.requests.lock().unwrap().push(request);
        result
    }
}

/// Shorthand for a canned response.
pub(crate) fn response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        body,
    }
}

/// Reply that ignores the request.
pub(crate) fn fixed(result: Result<HttpResponse, TransportError>) -> Reply {
    Box::new(move |_| result)
}

/// Signup reply that echoes the requested username with a 201.
pub(crate) fn signup_echo(user_id: &'static str) -> Reply {
    Box::new(move |request| {
        let username = request
            .body
            .as_ref()
            .and_then(|body| body.get("userName"))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(response(201, serde_json::json!({"userID": user_id, "username": username, "books": []})))
    })
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub(crate) struct RecordingSink {
    /// Events recorded so far.
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingSink {
    /// Events recorded so far.
    pub(crate) fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Kinds of the events recorded so far.
    pub(crate) fn kinds(&self) -> Vec<AuditEventKind> {
        self.events().into_iter().map(|event| event.event).collect()
    }
}

impl AuditSink for RecordingSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
