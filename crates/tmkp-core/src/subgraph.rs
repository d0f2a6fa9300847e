//! # Subgraph Generator
//!
//! Progressive relaxation of an over-constrained query graph.
//!
//! Every yielded graph keeps the full node list and drops exactly one edge:
//! one of the edges with the smallest combined endpoint degree. Pinned
//! (curie) nodes count as [`SENTINEL_DEGREE`], so their edges are only
//! candidates once no other edge is left, and then never removed at all.
//!
//! Nodes left without edges are NOT pruned from the yielded graphs.

use crate::primitives::SENTINEL_DEGREE;
use crate::types::QueryGraph;
use std::collections::BTreeMap;

/// Lazy sequence of relaxed query graphs.
#[derive(Debug, Clone)]
pub struct Relaxations<'a> {
    qgraph: &'a QueryGraph,
    candidates: std::vec::IntoIter<usize>,
}

impl Iterator for Relaxations<'_> {
    type Item = QueryGraph;

    fn next(&mut self) -> Option<Self::Item> {
        let removed = self.candidates.next()?;
        let edges = self
            .qgraph
            .edges
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != removed)
            .map(|(_, edge)| edge.clone())
            .collect();
        Some(QueryGraph::new(self.qgraph.nodes.clone(), edges))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.candidates.size_hint()
    }
}

impl ExactSizeIterator for Relaxations<'_> {}

/// Relax `qgraph` by one edge, yielding every minimum-importance choice.
///
/// Empty when the graph has no edges or every edge touches a pinned node.
#[must_use]
pub fn relaxations(qgraph: &QueryGraph) -> Relaxations<'_> {
    let importance = edge_importance(qgraph);
    let candidates = match importance.iter().min() {
        Some(&min) if min < SENTINEL_DEGREE => importance
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value == min)
            .map(|(idx, _)| idx)
            .collect(),
        _ => Vec::new(),
    };
    Relaxations {
        qgraph,
        candidates: candidates.into_iter(),
    }
}

/// Sum of endpoint degrees per edge, in edge order.
fn edge_importance(qgraph: &QueryGraph) -> Vec<usize> {
    let mut degree: BTreeMap<&str, usize> = BTreeMap::new();
    for edge in &qgraph.edges {
        for endpoint in [edge.source_id.as_str(), edge.target_id.as_str()] {
            let d = degree.entry(endpoint).or_insert(0);
            *d = d.saturating_add(1);
        }
    }
    for node in qgraph.nodes.iter().filter(|n| n.is_pinned()) {
        degree.insert(node.id.as_str(), SENTINEL_DEGREE);
    }
    let degree_of = |id: &str| degree.get(id).copied().unwrap_or(0);
    qgraph
        .edges
        .iter()
        .map(|e| degree_of(&e.source_id).saturating_add(degree_of(&e.target_id)))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QueryEdge, QueryNode};

    fn edge_ids(graph: &QueryGraph) -> Vec<&str> {
        graph.edges.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn no_edges_yields_nothing() {
        let qgraph = QueryGraph::new(vec![QueryNode::new("n0")], vec![]);
        assert_eq!(relaxations(&qgraph).count(), 0);
    }

    #[test]
    fn pinned_only_edges_are_never_removed() {
        let qgraph = QueryGraph::new(
            vec![
                QueryNode::new("n0").with_curie("CHEBI:3215"),
                QueryNode::new("n1"),
            ],
            vec![QueryEdge::new("e0", "n0", "n1")],
        );
        assert_eq!(relaxations(&qgraph).count(), 0);
    }

    #[test]
    fn unpinned_edge_is_removed_before_pinned_ones() {
        // n0(pinned) - n1 - n2 - n3
        let qgraph = QueryGraph::new(
            vec![
                QueryNode::new("n0").with_curie("CHEBI:3215"),
                QueryNode::new("n1"),
                QueryNode::new("n2"),
                QueryNode::new("n3"),
            ],
            vec![
                QueryEdge::new("e0", "n0", "n1"),
                QueryEdge::new("e1", "n1", "n2"),
                QueryEdge::new("e2", "n2", "n3"),
            ],
        );
        let relaxed: Vec<QueryGraph> = relaxations(&qgraph).collect();
        assert_eq!(relaxed.len(), 1);
        assert_eq!(edge_ids(&relaxed[0]), ["e0", "e1"]);
        assert_eq!(relaxed[0].nodes.len(), 4);
    }

    #[test]
    fn ties_are_all_yielded() {
        // Path n0 - n1 - n2 - n3: the two end edges have importance 3.
        let qgraph = QueryGraph::new(
            (0..4).map(|i| QueryNode::new(format!("n{i}"))).collect(),
            vec![
                QueryEdge::new("e0", "n0", "n1"),
                QueryEdge::new("e1", "n1", "n2"),
                QueryEdge::new("e2", "n2", "n3"),
            ],
        );
        let relaxed: Vec<Vec<String>> = relaxations(&qgraph)
            .map(|g| g.edges.into_iter().map(|e| e.id).collect())
            .collect();
        assert_eq!(relaxed, [vec!["e1", "e2"], vec!["e0", "e1"]]);
    }

    #[test]
    fn size_hint_is_exact() {
        let qgraph = QueryGraph::new(
            (0..3).map(|i| QueryNode::new(format!("n{i}"))).collect(),
            vec![QueryEdge::new("e0", "n0", "n1"), QueryEdge::new("e1", "n1", "n2")],
        );
        let iter = relaxations(&qgraph);
        assert_eq!(iter.len(), 2);
    }
}
