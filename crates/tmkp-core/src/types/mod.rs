//! # Core Type Definitions
//!
//! This module contains all core types for the tmkp translator:
//! - Query graph model (`QueryNode`, `QueryEdge`, `QueryGraph`)
//! - Store result rows (`Binding`, `SolutionRow`, `SparqlResults`)
//! - Knowledge graph model (`KgNode`, `KgEdge`, `KnowledgeGraph`)
//! - Result bindings (`NodeBinding`, `EdgeBinding`, `QueryResult`, `EvidenceRecord`)
//! - Compiled output (`CompiledQuery`)
//! - Error types (`TmkpError`)
//!
//! ## Determinism Guarantees
//!
//! All collections that are observable in output text or merge order are
//! `BTreeMap`/`BTreeSet` or explicitly sorted `Vec`s.

mod kgraph;
mod qgraph;
mod results;
mod rows;

pub use kgraph::{KgEdge, KgNode, KnowledgeGraph};
pub use qgraph::{QueryEdge, QueryGraph, QueryNode};
pub use results::{EdgeBinding, EvidenceRecord, NodeBinding, QueryResult};
pub use rows::{Binding, ResultsBody, ResultsHead, SolutionRow, SparqlResults};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// COMPILED QUERY
// =============================================================================

/// Query text produced by the compiler, plus its projection.
///
/// `variables` holds the declared output variable names (without the `?`
/// sigil), sorted lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub text: String,
    pub variables: Vec<String>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while translating or decoding.
///
/// - No silent failures: a missing variable in a row is an error, not a skip
/// - Fatal errors abort the whole request, no partial graph is returned
/// - Empty relation resolution is NOT an error (it compiles to a query that
///   can never match)
#[derive(Debug, Error)]
pub enum TmkpError {
    /// An edge references a node id that is not in the query graph.
    #[error("Edge '{edge_id}' references unknown node '{node_id}'")]
    GraphReference { edge_id: String, node_id: String },

    /// Two nodes or two edges share the same id.
    #[error("Duplicate query graph id: {0}")]
    DuplicateId(String),

    /// A query graph id, type or curie cannot be written into query text.
    #[error("Invalid query graph identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The query graph exceeds a hard size limit.
    #[error("Query graph too large: {0}")]
    LimitExceeded(String),

    /// A result row is missing a variable the decoder expects.
    #[error("Result row {row} is missing variable '{variable}'")]
    Decoding { row: usize, variable: String },

    /// A round trip to the external query executor failed.
    #[error("External lookup failed: {0}")]
    ExternalLookup(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TmkpError {
    /// Whether the error was caused by the caller's query graph.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::GraphReference { .. }
                | Self::DuplicateId(_)
                | Self::InvalidIdentifier(_)
                | Self::LimitExceeded(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
