//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use tmkp::api::{
    ErrorResponse, HealthResponse, QueryInput, QueryParams, QueryRequest, StatusResponse,
};
use tmkp::pipeline::Message;
use tmkp_core::{QueryEdge, QueryGraph, QueryNode};

// =============================================================================
// HEALTH / STATUS RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_status_response_serialization() {
    let status = StatusResponse {
        sparql_endpoint: "http://store/sparql".to_string(),
        prefix_table_version: "tmkp-2020.1".to_string(),
        prefix_count: 100,
        evidence: true,
    };

    let json = serde_json::to_string(&status).unwrap();
    assert!(json.contains("\"prefix_table_version\":\"tmkp-2020.1\""));
    assert!(json.contains("\"evidence\":true"));
}

// =============================================================================
// QUERY PARAMS TESTS
// =============================================================================

#[test]
fn test_query_params_defaults() {
    let params: QueryParams = serde_json::from_str("{}").unwrap();
    let options = params.options();
    assert!(options.strict);
    assert_eq!(options.limit, None);
}

#[test]
fn test_query_params_limit() {
    let params: QueryParams = serde_json::from_str(r#"{"strict": false, "limit": 0}"#).unwrap();
    let options = params.options();
    assert!(!options.strict);
    assert_eq!(options.limit, Some(0));
}

// =============================================================================
// QUERY REQUEST TESTS
// =============================================================================

#[test]
fn test_query_request_deserialization() {
    let json = r#"{
        "message": {
            "query_graph": {
                "nodes": [
                    {"id": "n0", "curie": "CHEBI:3215", "type": "chemical_substance"},
                    {"id": "n1", "type": "gene_product"}
                ],
                "edges": [
                    {"id": "e0", "source_id": "n0", "target_id": "n1", "type": "affects"}
                ]
            }
        }
    }"#;
    let request: QueryRequest = serde_json::from_str(json).unwrap();
    let qgraph = request.message.query_graph;

    assert_eq!(qgraph.nodes[0].curie.as_deref(), Some("CHEBI:3215"));
    assert_eq!(qgraph.nodes[1].node_type.as_deref(), Some("gene_product"));
    assert!(qgraph.nodes[1].curie.is_none());
    assert_eq!(qgraph.edges[0].edge_type.as_deref(), Some("affects"));
}

#[test]
fn test_query_request_missing_message_rejected() {
    let result: Result<QueryRequest, _> =
        serde_json::from_str(r#"{"query_graph": {"nodes": [], "edges": []}}"#);
    assert!(result.is_err());
}

#[test]
fn test_query_input_accepts_both_shapes() {
    let bare: QueryInput =
        serde_json::from_str(r#"{"nodes": [{"id": "n0"}], "edges": []}"#).unwrap();
    let envelope: QueryInput = serde_json::from_str(
        r#"{"message": {"query_graph": {"nodes": [{"id": "n0"}], "edges": []}}}"#,
    )
    .unwrap();

    assert_eq!(bare.into_query_graph(), envelope.into_query_graph());
}

// =============================================================================
// MESSAGE / ERROR TESTS
// =============================================================================

#[test]
fn test_empty_message_shape() {
    let qgraph = QueryGraph::new(
        vec![QueryNode::new("n0"), QueryNode::new("n1")],
        vec![QueryEdge::new("e0", "n0", "n1")],
    );
    let value = serde_json::to_value(Message::empty(qgraph)).unwrap();

    assert_eq!(value["knowledge_graph"], serde_json::json!({"nodes": [], "edges": []}));
    assert_eq!(value["results"], serde_json::json!([]));
    assert_eq!(value["query_graph"]["edges"][0]["source_id"], "n0");
}

#[test]
fn test_error_response_serialization() {
    let error = ErrorResponse::new("External lookup failed: timeout");
    let json = serde_json::to_string(&error).unwrap();
    assert_eq!(
        json,
        r#"{"success":false,"error":"External lookup failed: timeout"}"#
    );
}
