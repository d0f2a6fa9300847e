//! # Query Compiler
//!
//! Turns a query graph into SPARQL text.
//!
//! Compilation is split into explicit steps so that the one effectful part,
//! relation resolution, stays outside the core:
//!
//! 1. [`QueryCompiler::relation_types`] lists the edge types to resolve.
//! 2. [`QueryCompiler::relation_query`] renders the lookup for one type.
//! 3. [`QueryCompiler::parse_relations`] decodes the lookup rows.
//! 4. [`QueryCompiler::compile`] renders the structural query.
//!
//! ## Variables
//!
//! | Variable | Meaning |
//! |---|---|
//! | `?<node>` | shared node instance (strict, and isolated nodes in lenient) |
//! | `?<node>_type` | class/curie resolution, nodes without a curie only |
//! | `?<node>_<i>` | edge-local endpoint instance for edge position `i` (lenient) |
//! | `?<edge>` | concrete relation |
//!
//! ## Strict vs lenient
//!
//! Strict mode shares one instance variable per query node across all its
//! edges and pins that instance's direct type. Lenient mode gives every edge
//! its own endpoint instances, linked to the node's class through inferred
//! `rdf:type` only, so one query node may bind different instances per edge.

use crate::codec::{PrefixTable, snake_to_pascal};
use crate::sparql::{QueryWriter, SLOT_MAPPING, resource};
use crate::types::{CompiledQuery, QueryEdge, QueryGraph, QueryNode, SolutionRow, TmkpError};
use std::collections::{BTreeMap, BTreeSet};

/// Resolved relations: abstract edge type -> concrete relation IRIs.
pub type RelationMap = BTreeMap<String, Vec<String>>;

/// Column returned by the relation lookup.
pub const PREDICATE_VARIABLE: &str = "predicate";

// =============================================================================
// OPTIONS
// =============================================================================

/// Compilation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Shared, direct-typed node instances (`true`) or edge-local ones.
    pub strict: bool,
    /// Trailing result cap, `None` for unbounded.
    pub limit: Option<u64>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            strict: true,
            limit: None,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict: false,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the limit from a signed value: any negative limit is unbounded.
    #[must_use]
    pub fn with_signed_limit(mut self, limit: i64) -> Self {
        self.limit = u64::try_from(limit).ok();
        self
    }
}

// =============================================================================
// VARIABLE NAMING
// =============================================================================

/// Shared instance variable of a node.
#[must_use]
pub fn instance_var(node_id: &str) -> String {
    node_id.to_string()
}

/// Class/curie-resolution variable of a node.
#[must_use]
pub fn type_var(node_id: &str) -> String {
    format!("{node_id}_type")
}

/// Edge-local endpoint instance variable (lenient mode).
#[must_use]
pub fn edge_local_var(node_id: &str, edge_index: usize) -> String {
    format!("{node_id}_{edge_index}")
}

/// Instance variable carrying an edge endpoint in the given mode.
#[must_use]
pub fn endpoint_var(node_id: &str, edge_index: usize, strict: bool) -> String {
    if strict {
        instance_var(node_id)
    } else {
        edge_local_var(node_id, edge_index)
    }
}

// =============================================================================
// COMPILER
// =============================================================================

/// Compiles query graphs against an injected prefix table.
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a> {
    table: &'a PrefixTable,
}

impl<'a> QueryCompiler<'a> {
    #[must_use]
    pub fn new(table: &'a PrefixTable) -> Self {
        Self { table }
    }

    /// Distinct edge types of the graph, sorted. One lookup per entry.
    #[must_use]
    pub fn relation_types(&self, qgraph: &QueryGraph) -> Vec<String> {
        qgraph
            .edges
            .iter()
            .filter_map(|e| e.edge_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Lookup text resolving an abstract edge type to concrete relations.
    ///
    /// Sub-slots of the type (transitively, via `blml:is_a`) are included.
    #[must_use]
    pub fn relation_query(&self, edge_type: &str) -> String {
        let mut w = QueryWriter::new();
        w.select([PREDICATE_VARIABLE]);
        w.line(&format!("?slot blml:is_a* bl:{edge_type} ."));
        w.line(&format!("?slot <{SLOT_MAPPING}> ?{PREDICATE_VARIABLE} ."));
        w.finish(None)
    }

    /// Decode relation lookup rows into sorted, distinct relation IRIs.
    pub fn parse_relations(&self, rows: &[SolutionRow]) -> Result<Vec<String>, TmkpError> {
        let mut relations = BTreeSet::new();
        for (idx, row) in rows.iter().enumerate() {
            let binding = row.require(PREDICATE_VARIABLE, idx)?;
            relations.insert(binding.value.clone());
        }
        Ok(relations.into_iter().collect())
    }

    /// Compile a query graph.
    ///
    /// The graph is validated first: a dangling edge endpoint fails before
    /// any text is produced. An edge type absent from `relations` compiles
    /// to an empty enumeration, which can never match.
    pub fn compile(
        &self,
        qgraph: &QueryGraph,
        relations: &RelationMap,
        options: CompileOptions,
    ) -> Result<CompiledQuery, TmkpError> {
        qgraph.validate()?;

        let mut variables = BTreeSet::new();
        let mut patterns: Vec<Pattern> = Vec::new();

        let connected = qgraph.connected_node_ids();
        for node in &qgraph.nodes {
            if options.strict || !connected.contains(node.id.as_str()) {
                self.shared_node_block(node, &mut variables, &mut patterns);
            }
        }

        for (idx, edge) in qgraph.edges.iter().enumerate() {
            self.edge_block(qgraph, idx, edge, relations, options, &mut variables, &mut patterns)?;
        }

        let mut w = QueryWriter::new();
        w.select(&variables);
        for pattern in &patterns {
            match pattern {
                Pattern::Line(text) => w.line(text),
                Pattern::Values { variable, terms } => {
                    w.line(&format!("VALUES ?{variable} {{ {} }}", terms.join(" ")))
                }
            }
        }
        let text = w.finish(options.limit);

        Ok(CompiledQuery {
            text,
            variables: variables.into_iter().collect(),
        })
    }

    /// Membership and identity constraints on a node's shared instance.
    fn shared_node_block(
        &self,
        node: &QueryNode,
        variables: &mut BTreeSet<String>,
        patterns: &mut Vec<Pattern>,
    ) {
        let instance = instance_var(&node.id);
        if let Some(membership) = self.membership(node) {
            patterns.push(Pattern::Line(format!("?{instance} rdf:type {membership} .")));
        }
        let identity = match &node.curie {
            Some(curie) => resource(self.table, curie),
            None => {
                let var = type_var(&node.id);
                let term = format!("?{var}");
                variables.insert(var);
                term
            }
        };
        patterns.push(Pattern::Line(format!(
            "?{instance} sesame:directType {identity} ."
        )));
        variables.insert(instance);
    }

    fn edge_block(
        &self,
        qgraph: &QueryGraph,
        idx: usize,
        edge: &QueryEdge,
        relations: &RelationMap,
        options: CompileOptions,
        variables: &mut BTreeSet<String>,
        patterns: &mut Vec<Pattern>,
    ) -> Result<(), TmkpError> {
        let source = endpoint_var(&edge.source_id, idx, options.strict);
        let target = endpoint_var(&edge.target_id, idx, options.strict);

        if !options.strict {
            let mut seen = BTreeSet::new();
            for node_id in [&edge.source_id, &edge.target_id] {
                if !seen.insert(node_id.as_str()) {
                    continue;
                }
                let node = qgraph.node(node_id).ok_or_else(|| TmkpError::GraphReference {
                    edge_id: edge.id.clone(),
                    node_id: node_id.clone(),
                })?;
                self.edge_local_block(node, idx, variables, patterns);
            }
        }

        if let Some(edge_type) = &edge.edge_type {
            let terms = relations
                .get(edge_type)
                .map(|iris| iris.iter().map(|iri| format!("<{iri}>")).collect())
                .unwrap_or_default();
            patterns.push(Pattern::Values {
                variable: edge.id.clone(),
                terms,
            });
        }
        patterns.push(Pattern::Line(format!("?{source} ?{} ?{target} .", edge.id)));
        variables.insert(edge.id.clone());
        Ok(())
    }

    /// Constraints on one lenient edge-local endpoint instance.
    fn edge_local_block(
        &self,
        node: &QueryNode,
        idx: usize,
        variables: &mut BTreeSet<String>,
        patterns: &mut Vec<Pattern>,
    ) {
        let instance = edge_local_var(&node.id, idx);
        if let Some(membership) = self.membership(node) {
            patterns.push(Pattern::Line(format!("?{instance} rdf:type {membership} .")));
        }
        if node.curie.is_none() {
            let var = type_var(&node.id);
            patterns.push(Pattern::Line(format!("?{instance} rdf:type ?{var} .")));
            variables.insert(var);
        }
        variables.insert(instance);
    }

    /// Class a node's instances must belong to, if any.
    fn membership(&self, node: &QueryNode) -> Option<String> {
        match (&node.curie, &node.node_type) {
            (Some(curie), _) => Some(resource(self.table, curie)),
            (None, Some(node_type)) => Some(format!("bl:{}", snake_to_pascal(node_type))),
            (None, None) => None,
        }
    }
}

/// A rendered line of the `WHERE` block.
#[derive(Debug)]
enum Pattern {
    Line(String),
    Values { variable: String, terms: Vec<String> },
}

// =============================================================================
// TESTS
// =============================================================================
