//! Query graph model: the abstract pattern a caller asks to match.

use super::TmkpError;
use crate::primitives::{MAX_QUERY_EDGES, MAX_QUERY_NODES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A node of the query graph.
///
/// A node with neither `curie` nor `node_type` is fully unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryNode {
    pub id: String,
    /// Pinned literal identifier, e.g. `CHEBI:3215`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curie: Option<String>,
    /// Semantic type name in underscore convention, e.g. `gene_product`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
}

impl QueryNode {
    /// Create an unconstrained node.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            curie: None,
            node_type: None,
        }
    }

    /// Pin the node to a literal identifier.
    #[must_use]
    pub fn with_curie(mut self, curie: impl Into<String>) -> Self {
        self.curie = Some(curie.into());
        self
    }

    /// Constrain the node to a semantic type.
    #[must_use]
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Whether the node carries a pinned identifier. An empty curie pins
    /// nothing.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.curie.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// An edge of the query graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    /// Abstract relation name, e.g. `negatively_regulates_entity_to_entity`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
}

impl QueryEdge {
    /// Create an untyped edge.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            edge_type: None,
        }
    }

    /// Constrain the edge to an abstract relation.
    #[must_use]
    pub fn with_type(mut self, edge_type: impl Into<String>) -> Self {
        self.edge_type = Some(edge_type.into());
        self
    }
}

/// The query graph: ordered nodes and ordered edges.
///
/// Read-only once handed to the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryGraph {
    #[serde(default)]
    pub nodes: Vec<QueryNode>,
    #[serde(default)]
    pub edges: Vec<QueryEdge>,
}

impl QueryGraph {
    /// Create a query graph from its parts.
    #[must_use]
    pub fn new(nodes: Vec<QueryNode>, edges: Vec<QueryEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Find a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&QueryNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Check the structural invariants of the graph.
    ///
    /// - at most `MAX_QUERY_NODES` nodes and `MAX_QUERY_EDGES` edges
    /// - every id is usable as a query variable name
    /// - ids are unique across nodes and edges together
    /// - no id equals a variable derived from a node id (`<node>_type`,
    ///   `<node>_<edge index>`)
    /// - node and edge types are plain vocabulary names, curies are
    ///   `prefix:local` without IRI delimiters
    /// - every edge endpoint names an existing node
    pub fn validate(&self) -> Result<(), TmkpError> {
        if self.nodes.len() > MAX_QUERY_NODES {
            return Err(TmkpError::LimitExceeded(format!(
                "{} nodes (max {MAX_QUERY_NODES})",
                self.nodes.len()
            )));
        }
        if self.edges.len() > MAX_QUERY_EDGES {
            return Err(TmkpError::LimitExceeded(format!(
                "{} edges (max {MAX_QUERY_EDGES})",
                self.edges.len()
            )));
        }

        let mut node_ids = BTreeSet::new();
        for node in &self.nodes {
            check_identifier(&node.id)?;
            if let Some(node_type) = &node.node_type {
                check_vocabulary_name(node_type)?;
            }
            if let Some(curie) = &node.curie {
                check_curie(curie)?;
            }
            if !node_ids.insert(node.id.as_str()) {
                return Err(TmkpError::DuplicateId(node.id.clone()));
            }
        }

        let mut edge_ids = BTreeSet::new();
        for edge in &self.edges {
            check_identifier(&edge.id)?;
            if let Some(edge_type) = &edge.edge_type {
                check_vocabulary_name(edge_type)?;
            }
            if node_ids.contains(edge.id.as_str()) || !edge_ids.insert(edge.id.as_str()) {
                return Err(TmkpError::DuplicateId(edge.id.clone()));
            }
            for endpoint in [&edge.source_id, &edge.target_id] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(TmkpError::GraphReference {
                        edge_id: edge.id.clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
        }

        for id in node_ids.iter().chain(edge_ids.iter()) {
            if self.is_derived_variable(id, &node_ids) {
                return Err(TmkpError::InvalidIdentifier(id.to_string()));
            }
        }
        Ok(())
    }

    /// Whether `id` is spelled like a variable the compiler derives from
    /// another node's id.
    fn is_derived_variable(&self, id: &str, node_ids: &BTreeSet<&str>) -> bool {
        let Some((owner, suffix)) = id.rsplit_once('_') else {
            return false;
        };
        if !node_ids.contains(owner) {
            return false;
        }
        suffix == "type"
            || suffix
                .parse::<usize>()
                .is_ok_and(|idx| idx < self.edges.len() && idx.to_string() == suffix)
    }

    /// Ids of nodes touched by at least one edge.
    #[must_use]
    pub fn connected_node_ids(&self) -> BTreeSet<&str> {
        self.edges
            .iter()
            .flat_map(|e| [e.source_id.as_str(), e.target_id.as_str()])
            .collect()
    }
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Ids become SPARQL variable names, so keep them to `[A-Za-z0-9_]+`.
fn check_identifier(id: &str) -> Result<(), TmkpError> {
    if is_word(id) {
        Ok(())
    } else {
        Err(TmkpError::InvalidIdentifier(id.to_string()))
    }
}

/// Types are written as `bl:<Name>` local names.
fn check_vocabulary_name(name: &str) -> Result<(), TmkpError> {
    if is_word(name) {
        Ok(())
    } else {
        Err(TmkpError::InvalidIdentifier(name.to_string()))
    }
}

/// Curies are written inside `<...>` after expansion.
fn check_curie(curie: &str) -> Result<(), TmkpError> {
    let has_prefix = curie.split_once(':').is_some_and(|(prefix, _)| !prefix.is_empty());
    let clean = curie
        .chars()
        .all(|c| !c.is_whitespace() && !c.is_control() && !"<>\"{}|^`\\".contains(c));
    if has_prefix && clean {
        Ok(())
    } else {
        Err(TmkpError::InvalidIdentifier(curie.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
