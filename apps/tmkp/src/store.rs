//! # Store Adapter
//!
//! The triple store is an external collaborator reached through
//! [`QueryExecutor`]. [`SparqlClient`] is the HTTP implementation; tests
//! substitute in-memory executors.
//!
//! Timeout policy lives here: the core never times out on its own.

use crate::config::StoreConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tmkp_core::{SolutionRow, SparqlResults, TmkpError};

/// Executes read-only SELECT queries against a store.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `query` and return its solution rows.
    async fn select(&self, query: &str) -> Result<Vec<SolutionRow>, TmkpError>;
}

// =============================================================================
// CLIENT ERRORS
// =============================================================================

/// Errors from the HTTP client layer.
#[derive(Debug)]
pub enum ClientError {
    /// Cannot reach the store.
    ConnectionFailed(String),
    /// 401 Unauthorized - invalid or missing store token.
    Unauthorized,
    /// 429 Too Many Requests.
    RateLimited,
    /// Any other non-success status.
    Status(u16, String),
    /// Failed to parse the results document.
    ParseError(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed(msg) => write!(f, "Cannot connect to store at {msg}"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid or missing store token"),
            Self::RateLimited => write!(f, "Rate limited by store"),
            Self::Status(status, msg) => write!(f, "Store error ({status}): {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ClientError> for TmkpError {
    fn from(err: ClientError) -> Self {
        TmkpError::ExternalLookup(err.to_string())
    }
}

// =============================================================================
// SPARQL CLIENT
// =============================================================================

/// SPARQL 1.1 protocol client (query via POST).
#[derive(Clone)]
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl SparqlClient {
    /// Create a client for `endpoint`.
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TmkpError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TmkpError::Config(format!("Cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token,
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, TmkpError> {
        Self::new(config.url.clone(), config.token.clone(), config.timeout())
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the POST request with optional Bearer auth.
    fn request(&self, query: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/sparql-query")
            .header(ACCEPT, "application/json")
            .body(query.to_string());
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.endpoint)))
    }

    /// Check the status code and decode the results document.
    async fn handle_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<Vec<SolutionRow>, ClientError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status(status.as_u16(), body));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        SparqlResults::from_slice(&bytes)
            .map(SparqlResults::into_rows)
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl QueryExecutor for SparqlClient {
    async fn select(&self, query: &str) -> Result<Vec<SolutionRow>, TmkpError> {
        tracing::debug!(endpoint = %self.endpoint, bytes = query.len(), "SPARQL select");
        let resp = self.send(self.request(query)).await?;
        let rows = self.handle_response(resp).await.map_err(|e| {
            tracing::warn!(endpoint = %self.endpoint, error = %e, "SPARQL select failed");
            e
        })?;
        tracing::debug!(rows = rows.len(), "SPARQL select complete");
        Ok(rows)
    }
}

// =============================================================================
// TESTS
// =============================================================================
