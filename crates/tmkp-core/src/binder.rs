//! # Result Binder
//!
//! Decodes structural-match rows into a deduplicated knowledge graph and
//! one [`QueryResult`] per row, then (optionally) attaches evidence.
//!
//! ## Node identity
//!
//! A pinned node binds to its curie. Any other node binds to the compacted
//! value of its `?<node>_type` variable.
//!
//! ## Edge identity
//!
//! Edges are keyed by the content hash of the compacted
//! `(relation, source, target)` triple, so N rows asserting one triple store
//! exactly one edge.
//!
//! ## Evidence
//!
//! Evidence lookups are keyed by the row's bound instance and relation
//! terms. Identical keys are looked up once and the records are fanned back
//! out to every edge binding sharing the key.

use crate::codec::PrefixTable;
use crate::compiler::{endpoint_var, type_var};
use crate::sparql::{QueryWriter, row_term};
use crate::types::{
    Binding, EdgeBinding, EvidenceRecord, KgEdge, KgNode, KnowledgeGraph, NodeBinding,
    QueryGraph, QueryResult, SolutionRow, TmkpError,
};
use std::collections::BTreeMap;

/// Evidence columns and the association property each one reads.
const EVIDENCE_COLUMNS: [(&str, &str); 6] = [
    ("publications", "bl:publications"),
    ("score", "tmp:score"),
    ("sentence", "tmp:sentence"),
    ("subject_spans", "tmp:subject_spans"),
    ("object_spans", "tmp:object_spans"),
    ("provided_by", "bl:provided_by"),
];

/// Bound terms identifying one asserted edge instance in the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EvidenceKey {
    pub source: Binding,
    pub relation: Binding,
    pub target: Binding,
}

/// Position of an edge binding: `results[result].edge_bindings[edge]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BindingSlot {
    pub result: usize,
    pub edge: usize,
}

/// One evidence lookup and the edge bindings it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceRequest {
    pub key: EvidenceKey,
    pub slots: Vec<BindingSlot>,
}

/// Decodes result rows against an injected prefix table.
#[derive(Debug, Clone, Copy)]
pub struct ResultBinder<'a> {
    table: &'a PrefixTable,
}

impl<'a> ResultBinder<'a> {
    #[must_use]
    pub fn new(table: &'a PrefixTable) -> Self {
        Self { table }
    }

    /// Structural decode: knowledge graph plus one result per row.
    ///
    /// A row missing any expected variable fails the whole decode.
    pub fn bind(
        &self,
        rows: &[SolutionRow],
        qgraph: &QueryGraph,
    ) -> Result<(KnowledgeGraph, Vec<QueryResult>), TmkpError> {
        let mut kgraph = KnowledgeGraph::new();
        let mut results = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            let mut result = QueryResult::default();
            let mut graph_ids: BTreeMap<&str, String> = BTreeMap::new();

            for node in &qgraph.nodes {
                let graph_id = match &node.curie {
                    Some(curie) => curie.clone(),
                    None => self
                        .table
                        .compact(&row.require(&type_var(&node.id), idx)?.value),
                };
                kgraph.upsert_node(KgNode::new(graph_id.clone()));
                result.node_bindings.push(NodeBinding {
                    query_node_id: node.id.clone(),
                    graph_node_id: graph_id.clone(),
                });
                graph_ids.insert(node.id.as_str(), graph_id);
            }

            for edge in &qgraph.edges {
                let relation = self.table.compact(&row.require(&edge.id, idx)?.value);
                let endpoint = |node_id: &str| {
                    graph_ids
                        .get(node_id)
                        .cloned()
                        .ok_or_else(|| TmkpError::GraphReference {
                            edge_id: edge.id.clone(),
                            node_id: node_id.to_string(),
                        })
                };
                let kg_edge = KgEdge::new(relation, endpoint(&edge.source_id)?, endpoint(&edge.target_id)?);
                let edge_id = kgraph.upsert_edge(kg_edge);
                result
                    .edge_bindings
                    .push(EdgeBinding::new(edge.id.clone(), edge_id));
            }

            results.push(result);
        }

        Ok((kgraph, results))
    }

    /// Distinct evidence lookups needed for the bound edges, sorted by key.
    ///
    /// `rows` and `qgraph` must be the ones passed to [`Self::bind`].
    pub fn evidence_requests(
        &self,
        rows: &[SolutionRow],
        qgraph: &QueryGraph,
        strict: bool,
    ) -> Result<Vec<EvidenceRequest>, TmkpError> {
        let mut grouped: BTreeMap<EvidenceKey, Vec<BindingSlot>> = BTreeMap::new();
        for (row_idx, row) in rows.iter().enumerate() {
            for (edge_idx, edge) in qgraph.edges.iter().enumerate() {
                let source = endpoint_var(&edge.source_id, edge_idx, strict);
                let target = endpoint_var(&edge.target_id, edge_idx, strict);
                let key = EvidenceKey {
                    source: row.require(&source, row_idx)?.clone(),
                    relation: row.require(&edge.id, row_idx)?.clone(),
                    target: row.require(&target, row_idx)?.clone(),
                };
                grouped.entry(key).or_default().push(BindingSlot {
                    result: row_idx,
                    edge: edge_idx,
                });
            }
        }
        Ok(grouped
            .into_iter()
            .map(|(key, slots)| EvidenceRequest { key, slots })
            .collect())
    }

    /// Lookup text for the evidence attached to one reified association.
    #[must_use]
    pub fn evidence_query(&self, key: &EvidenceKey) -> String {
        let mut w = QueryWriter::new();
        w.select(EVIDENCE_COLUMNS.iter().map(|(column, _)| *column));
        w.line(&format!("?association rdf:subject {} .", row_term(&key.source)));
        w.line(&format!("?association rdf:predicate {} .", row_term(&key.relation)));
        w.line(&format!("?association rdf:object {} .", row_term(&key.target)));
        for (column, property) in EVIDENCE_COLUMNS {
            w.line(&format!("OPTIONAL {{ ?association {property} ?{column} . }}"));
        }
        w.finish(None)
    }

    /// Decode evidence rows. Rows carrying none of the columns are dropped.
    #[must_use]
    pub fn parse_evidence(&self, rows: &[SolutionRow]) -> Vec<EvidenceRecord> {
        rows.iter()
            .filter_map(|row| {
                let text = |column: &str| row.value(column).map(str::to_string);
                let record = EvidenceRecord {
                    publication: text("publications"),
                    score: row.value("score").and_then(|s| s.trim().parse().ok()),
                    sentence: text("sentence"),
                    subject_spans: text("subject_spans"),
                    object_spans: text("object_spans"),
                    provided_by: text("provided_by"),
                };
                (record != EvidenceRecord::default()).then_some(record)
            })
            .collect()
    }

    /// Append records to every edge binding served by `request`.
    ///
    /// Slots outside `results` are ignored.
    pub fn attach_evidence(
        &self,
        results: &mut [QueryResult],
        request: &EvidenceRequest,
        records: &[EvidenceRecord],
    ) {
        for slot in &request.slots {
            if let Some(binding) = results
                .get_mut(slot.result)
                .and_then(|r| r.edge_bindings.get_mut(slot.edge))
            {
                binding.evidence.extend_from_slice(records);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
