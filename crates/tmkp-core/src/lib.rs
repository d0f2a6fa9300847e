//! # tmkp-core
//!
//! The deterministic query translator for tmkp - THE LOGIC.
//!
//! This crate translates abstract query graphs into SPARQL and decodes the
//! store's result rows back into a deduplicated knowledge graph with
//! per-match bindings.
//!
//! ## Three-Phase Protocol
//!
//! 1. Structural match: [`QueryCompiler`] -> store -> [`ResultBinder`]
//! 2. Evidence (optional): [`ResultBinder::evidence_query`] per distinct edge instance
//! 3. Metadata: [`DetailQueryBuilder`] -> store -> [`DetailParser`]
//!
//! The [`subgraph`] generator is independent and works on the query graph only.
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Every round trip is an explicit step: the core renders the query text
//!   and decodes the rows, the caller executes them
//! - The prefix table is an injected value, never global state
//! - Output text and merge order are deterministic (`BTreeMap`/`BTreeSet`)

// =============================================================================
// MODULES
// =============================================================================

pub mod binder;
pub mod codec;
pub mod compiler;
pub mod details;
pub mod digest;
pub mod primitives;
pub mod sparql;
pub mod subgraph;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Binding, CompiledQuery, EdgeBinding, EvidenceRecord, KgEdge, KgNode, KnowledgeGraph,
    NodeBinding, QueryEdge, QueryGraph, QueryNode, QueryResult, ResultsBody, ResultsHead,
    SolutionRow, SparqlResults, TmkpError,
};

// =============================================================================
// RE-EXPORTS: Translator
// =============================================================================

pub use binder::{BindingSlot, EvidenceKey, EvidenceRequest, ResultBinder};
pub use codec::{PrefixTable, pascal_to_snake, snake_to_pascal};
pub use compiler::{CompileOptions, QueryCompiler, RelationMap};
pub use details::{DetailParser, DetailQueries, DetailQueryBuilder};
pub use digest::edge_id;
pub use subgraph::{Relaxations, relaxations};
