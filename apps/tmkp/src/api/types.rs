//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use serde::{Deserialize, Serialize};
use tmkp_core::{CompileOptions, QueryGraph};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Translator status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub sparql_endpoint: String,
    pub prefix_table_version: String,
    pub prefix_count: usize,
    pub evidence: bool,
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// `?strict=<bool>&limit=<i64>` on `/query` and `/transpile`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    pub strict: bool,
    /// Negative means unbounded.
    pub limit: i64,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            strict: true,
            limit: -1,
        }
    }
}

impl QueryParams {
    #[must_use]
    pub fn options(&self) -> CompileOptions {
        CompileOptions {
            strict: self.strict,
            limit: None,
        }
        .with_signed_limit(self.limit)
    }
}

// =============================================================================
// QUERY REQUEST
// =============================================================================

/// `{"message": {"query_graph": {...}}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub message: QueryMessage,
}

/// The inbound message: only the query graph is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMessage {
    pub query_graph: QueryGraph,
}

/// Either a full request envelope or a bare query graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryInput {
    Envelope(QueryRequest),
    Bare(QueryGraph),
}

impl QueryInput {
    #[must_use]
    pub fn into_query_graph(self) -> QueryGraph {
        match self {
            Self::Envelope(request) => request.message.query_graph,
            Self::Bare(qgraph) => qgraph,
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
