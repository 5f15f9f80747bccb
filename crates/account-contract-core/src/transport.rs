// crates/account-contract-core/src/transport.rs
// ============================================================================
// Module: HTTP Transport
// Description: Pluggable HTTP client adapter for the account contract suite.
// Purpose: Issue one request per call and return the raw status plus JSON body.
// Dependencies: async-trait, reqwest, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The transport layer sends a single HTTP request against a base URL and
//! hands back the status code and parsed body exactly as received. It never
//! retries and applies no timeout beyond the optional one it was built with.
//! Connection-level failures surface as [`TransportError`]; HTTP 4xx/5xx
//! responses are ordinary [`HttpResponse`] values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// HTTP methods used by account lifecycle calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outbound request, relative to the transport base URL.
///
/// # Invariants
/// - `path` starts with `/` and is appended verbatim to the base URL.
/// - Header names are stored lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Path (and optional query) appended to the base URL.
    pub path: String,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
}

impl HttpRequest {
    /// Builds a request with no body and no headers.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header, lowercasing the name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Adds an `Authorization: Bearer` header.
    #[must_use]
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header(AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    /// Returns the value of a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

// ============================================================================
// SECTION: Response Types
// ============================================================================

/// Status and body of a completed HTTP exchange.
///
/// # Invariants
/// - `body` is `Value::Null` when the response body was empty.
/// - `body` is `Value::String` holding the raw text when it was not JSON.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HttpResponse {
    /// Raw HTTP status code.
    pub status: u16,
    /// Parsed response body.
    pub body: Value,
}

impl HttpResponse {
    /// Builds a response from a status code and raw body bytes.
    #[must_use]
    pub fn from_raw(status: u16, bytes: &[u8]) -> Self {
        Self {
            status,
            body: parse_body(bytes),
        }
    }

    /// Returns a top-level string field of an object body.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.body.get(name).and_then(Value::as_str)
    }
}

/// Parses bytes as JSON, falling back to the raw text.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures below the HTTP semantic layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Transport could not be constructed.
    #[error("transport setup failed: {0}")]
    Setup(String),
    /// Request could not be built (bad URL, header or body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Connection could not be established (DNS, TCP, TLS).
    #[error("connection failed: {0}")]
    Connect(String),
    /// Request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Connection broke while sending or reading the response.
    #[error("transport failure: {0}")]
    Io(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sends HTTP requests to the account service.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs exactly one HTTP exchange.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// ============================================================================
// SECTION: Reqwest Transport
// ============================================================================

/// [`HttpTransport`] backed by a `reqwest` client.
///
/// # Invariants
/// - `base_url` carries no trailing slash.
/// - Redirects are not followed.
pub struct ReqwestTransport {
    /// Base URL (no trailing slash).
    base_url: String,
    /// Underlying HTTP client.
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport for the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Setup`] when the HTTP client cannot be built.
    pub fn new(mut base_url: String, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().redirect(Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| TransportError::Setup(err.to_string()))?;
        let trimmed_len = base_url.trim_end_matches('/').len();
        base_url.truncate(trimmed_len);
        Ok(Self {
            base_url,
            client,
        })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder =
            self.client.request(method, url).headers(build_headers(&request.headers)?);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Ok(HttpResponse::from_raw(status, &bytes))
    }
}

/// Converts request headers into a validated header map.
fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid header name {name}")))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            TransportError::InvalidRequest(format!("invalid value for header {name}"))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}
