//! Knowledge graph model: the deduplicated graph decoded from result rows.

use crate::digest::edge_id;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A node of the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KgNode {
    /// Compacted identifier: the pinned curie or the compacted bound class.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Semantic type labels, underscore convention, serialized sorted.
    #[serde(rename = "type", default)]
    pub types: BTreeSet<String>,
}

impl KgNode {
    /// Create a node with no name and no types.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            types: BTreeSet::new(),
        }
    }

    /// Merge another record for the same id into this one.
    fn merge(&mut self, other: KgNode) {
        if other.name.is_some() {
            self.name = other.name;
        }
        self.types.extend(other.types);
    }
}

/// A content-addressed edge of the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KgEdge {
    /// Content hash of `(type, source_id, target_id)` at decode time.
    pub id: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub source_id: String,
    pub target_id: String,
}

impl KgEdge {
    /// Create an edge whose id is the content hash of its triple.
    #[must_use]
    pub fn new(
        edge_type: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        let edge_type = edge_type.into();
        let source_id = source_id.into();
        let target_id = target_id.into();
        Self {
            id: edge_id(&edge_type, &source_id, &target_id),
            edge_type,
            source_id,
            target_id,
        }
    }
}

/// The knowledge graph accumulated across the decode and detail phases.
///
/// Uses `BTreeMap` so that serialization order is the id order.
/// Entries are only ever inserted or merged, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "KnowledgeGraphDoc", from = "KnowledgeGraphDoc")]
pub struct KnowledgeGraph {
    nodes: BTreeMap<String, KgNode>,
    edges: BTreeMap<String, KgEdge>,
}

impl KnowledgeGraph {
    /// Create an empty knowledge graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, merging into the existing record for the same id.
    ///
    /// Returns the node id.
    pub fn upsert_node(&mut self, node: KgNode) -> String {
        let id = node.id.clone();
        match self.nodes.get_mut(&id) {
            Some(existing) => existing.merge(node),
            None => {
                self.nodes.insert(id.clone(), node);
            }
        }
        id
    }

    /// Insert an edge. Identical triples collapse onto one entry.
    ///
    /// Returns the edge id.
    pub fn upsert_edge(&mut self, edge: KgEdge) -> String {
        let id = edge.id.clone();
        self.edges.entry(id.clone()).or_insert(edge);
        id
    }

    /// Lookup a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&KgNode> {
        self.nodes.get(id)
    }

    /// Mutable lookup of a node by id.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut KgNode> {
        self.nodes.get_mut(id)
    }

    /// Lookup an edge by id.
    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&KgEdge> {
        self.edges.get(id)
    }

    /// Mutable lookup of an edge by id.
    pub fn edge_mut(&mut self, id: &str) -> Option<&mut KgEdge> {
        self.edges.get_mut(id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &KgNode> {
        self.nodes.values()
    }

    /// All edges in id order.
    pub fn edges(&self) -> impl Iterator<Item = &KgEdge> {
        self.edges.values()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Wire form of the knowledge graph: `{nodes: [...], edges: [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct KnowledgeGraphDoc {
    #[serde(default)]
    nodes: Vec<KgNode>,
    #[serde(default)]
    edges: Vec<KgEdge>,
}

impl From<KnowledgeGraph> for KnowledgeGraphDoc {
    fn from(graph: KnowledgeGraph) -> Self {
        Self {
            nodes: graph.nodes.into_values().collect(),
            edges: graph.edges.into_values().collect(),
        }
    }
}

impl From<KnowledgeGraphDoc> for KnowledgeGraph {
    fn from(doc: KnowledgeGraphDoc) -> Self {
        let mut graph = KnowledgeGraph::new();
        for node in doc.nodes {
            graph.upsert_node(node);
        }
        for edge in doc.edges {
            graph.upsert_edge(edge);
        }
        graph
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_triples_collapse() {
        let mut graph = KnowledgeGraph::new();
        let a = graph.upsert_edge(KgEdge::new("RO:0002212", "CHEBI:3215", "PR:000031567"));
        let b = graph.upsert_edge(KgEdge::new("RO:0002212", "CHEBI:3215", "PR:000031567"));
        assert_eq!(a, b);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn direction_matters_for_edge_identity() {
        let forward = KgEdge::new("RO:0002212", "CHEBI:3215", "PR:000031567");
        let backward = KgEdge::new("RO:0002212", "PR:000031567", "CHEBI:3215");
        assert_ne!(forward.id, backward.id);
    }

    #[test]
    fn upsert_node_merges_types_and_keeps_name() {
        let mut graph = KnowledgeGraph::new();
        let mut named = KgNode::new("CHEBI:3215");
        named.name = Some("bupivacaine".to_string());
        named.types.insert("chemical_substance".to_string());
        graph.upsert_node(named);

        let mut bare = KgNode::new("CHEBI:3215");
        bare.types.insert("named_thing".to_string());
        graph.upsert_node(bare);

        let node = graph.node("CHEBI:3215").expect("node");
        assert_eq!(node.name.as_deref(), Some("bupivacaine"));
        assert_eq!(node.types.len(), 2);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn serializes_as_sorted_lists() {
        let mut graph = KnowledgeGraph::new();
        graph.upsert_node(KgNode::new("PR:000031567"));
        let mut node = KgNode::new("CHEBI:3215");
        node.types.insert("gene_product".to_string());
        node.types.insert("gene_or_gene_product".to_string());
        graph.upsert_node(node);

        let json = serde_json::to_value(&graph).expect("serialize");
        assert_eq!(json["nodes"][0]["id"], "CHEBI:3215");
        assert_eq!(
            json["nodes"][0]["type"],
            serde_json::json!(["gene_or_gene_product", "gene_product"])
        );
        assert!(json["nodes"][1].get("name").is_none());
        assert_eq!(json["edges"], serde_json::json!([]));

        let restored: KnowledgeGraph = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, graph);
    }
}
