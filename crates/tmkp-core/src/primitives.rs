//! # Translator Primitives
//!
//! Fixed constants of the tmkp translator.
//!
//! These are compiled into the binary and immutable at runtime. Anything an
//! operator may want to change per environment (the prefix table, the store
//! endpoint) is injected as configuration instead.

/// Version tag of the built-in prefix table.
///
/// Compaction is order-sensitive, so a table edit that changes which entry
/// matches first must bump this tag.
pub const DEFAULT_TABLE_VERSION: &str = "tmkp-2020.1";

/// Degree assigned to curie-pinned nodes by the subgraph generator.
///
/// Any edge touching a pinned node has an importance of at least this value
/// and is only removable once no other edge is left.
pub const SENTINEL_DEGREE: usize = 99_999;

/// Number of zero-padded digits in detail query aliases (`n0000`, `e0000`).
pub const ALIAS_WIDTH: usize = 4;

/// Variable name bound to the relation alias in detail queries.
pub const ALIAS_VARIABLE: &str = "qid";

/// Variable name bound to the identifier in detail queries.
pub const IDENTIFIER_VARIABLE: &str = "kid";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of nodes in a query graph.
///
/// Every node adds a join to the structural query. Larger graphs are
/// rejected before any query text is produced.
pub const MAX_QUERY_NODES: usize = 64;

/// Maximum number of edges in a query graph.
pub const MAX_QUERY_EDGES: usize = 128;
