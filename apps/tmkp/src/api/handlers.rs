//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{ErrorResponse, HealthResponse, QueryInput, QueryParams, QueryRequest, StatusResponse},
};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tmkp_core::{QueryGraph, TmkpError, relaxations};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// 400 for caller mistakes, 502 for store failures, 500 otherwise.
fn error_status(err: &TmkpError) -> StatusCode {
    match err {
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        TmkpError::Decoding { .. } | TmkpError::ExternalLookup(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &TmkpError) -> Response {
    let status = error_status(err);
    tracing::warn!(status = status.as_u16(), error = %err, "Request failed");
    (status, Json(ErrorResponse::new(err.to_string()))).into_response()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Store endpoint and translator configuration.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let prefixes = state.pipeline.prefixes();
    let response = StatusResponse {
        sparql_endpoint: state.config.store.url.clone(),
        prefix_table_version: prefixes.version().to_string(),
        prefix_count: prefixes.len(),
        evidence: state.pipeline.evidence(),
    };

    (StatusCode::OK, Json(response))
}

// =============================================================================
// QUERY HANDLER
// =============================================================================

/// Answer a query graph.
pub async fn query_handler(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    Json(request): Json<QueryRequest>,
) -> Response {
    let qgraph = request.message.query_graph;
    match state.pipeline.answer(qgraph, params.options()).await {
        Ok(message) => (StatusCode::OK, Json(message)).into_response(),
        Err(e) => error_response(&e),
    }
}

// =============================================================================
// TRANSPILE HANDLER
// =============================================================================

/// Compile a query graph and return the query text.
pub async fn transpile_handler(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    Json(input): Json<QueryInput>,
) -> Response {
    let qgraph = input.into_query_graph();
    match state.pipeline.transpile(&qgraph, params.options()).await {
        Ok(compiled) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            compiled.text,
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

// =============================================================================
// SUBQUERY HANDLER
// =============================================================================

/// Relax a query graph by one edge.
pub async fn subquery_handler(Json(input): Json<QueryInput>) -> Response {
    let qgraph = input.into_query_graph();
    if let Err(e) = qgraph.validate() {
        return error_response(&e);
    }
    let relaxed: Vec<QueryGraph> = relaxations(&qgraph).collect();
    (StatusCode::OK, Json(relaxed)).into_response()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            error_status(&TmkpError::DuplicateId("n0".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&TmkpError::Decoding {
                row: 0,
                variable: "n0_type".to_string()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&TmkpError::ExternalLookup("down".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&TmkpError::Io("disk".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
