//! # Detail Queries
//!
//! Batched metadata enrichment of a decoded knowledge graph.
//!
//! [`DetailQueryBuilder`] renders one node lookup (superclasses and labels)
//! and one slot lookup (vocabulary slot per relation) for the whole graph,
//! never one round trip per entity. [`DetailParser`] merges their rows back.
//!
//! Both queries bind short aliases to identifiers through
//! `VALUES (?kid ?qid) { ... }`, so rows come back keyed by alias.

use crate::codec::{PrefixTable, pascal_to_snake};
use crate::primitives::{ALIAS_VARIABLE, ALIAS_WIDTH, IDENTIFIER_VARIABLE};
use crate::sparql::{BL, QueryWriter, SLOT_MAPPING, literal, resource};
use crate::types::{KnowledgeGraph, SolutionRow, TmkpError};
use std::collections::{BTreeMap, BTreeSet};

/// Node lookup column holding a biolink superclass.
pub const CLASS_VARIABLE: &str = "blclass";
/// Slot lookup column holding the vocabulary slot.
pub const SLOT_VARIABLE: &str = "blslot";
/// Label column of both lookups.
pub const LABEL_VARIABLE: &str = "label";

/// The two metadata lookups for a knowledge graph and their alias maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailQueries {
    pub node_query: String,
    pub slot_query: String,
    /// `n0000` -> node id.
    pub node_aliases: BTreeMap<String, String>,
    /// `e0000` -> ids of every edge sharing that relation.
    pub edge_aliases: BTreeMap<String, Vec<String>>,
}

// =============================================================================
// BUILDER
// =============================================================================

/// Renders detail lookups against an injected prefix table.
#[derive(Debug, Clone, Copy)]
pub struct DetailQueryBuilder<'a> {
    table: &'a PrefixTable,
}

impl<'a> DetailQueryBuilder<'a> {
    #[must_use]
    pub fn new(table: &'a PrefixTable) -> Self {
        Self { table }
    }

    /// Build both lookups.
    ///
    /// Node aliases follow node id order. Edges are first grouped by
    /// relation, and relation aliases follow sorted relation order.
    #[must_use]
    pub fn build(&self, kgraph: &KnowledgeGraph) -> DetailQueries {
        let node_aliases: BTreeMap<String, String> = kgraph
            .nodes()
            .enumerate()
            .map(|(idx, node)| (alias('n', idx), node.id.clone()))
            .collect();

        let mut by_relation: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for edge in kgraph.edges() {
            by_relation
                .entry(edge.edge_type.as_str())
                .or_default()
                .push(edge.id.clone());
        }
        let relation_aliases: Vec<(String, &str)> = by_relation
            .keys()
            .enumerate()
            .map(|(idx, relation)| (alias('e', idx), *relation))
            .collect();

        let node_query = self.node_query(&node_aliases);
        let slot_query = self.slot_query(&relation_aliases);
        let edge_aliases = relation_aliases
            .into_iter()
            .map(|(alias, relation)| {
                let ids = by_relation.get(relation).cloned().unwrap_or_default();
                (alias, ids)
            })
            .collect();

        DetailQueries {
            node_query,
            slot_query,
            node_aliases,
            edge_aliases,
        }
    }

    fn node_query(&self, aliases: &BTreeMap<String, String>) -> String {
        let mut w = QueryWriter::new();
        w.select([ALIAS_VARIABLE, CLASS_VARIABLE, LABEL_VARIABLE]);
        self.values(&mut w, aliases.iter().map(|(a, id)| (a.as_str(), id.as_str())));
        w.open("OPTIONAL");
        w.line(&format!("?{IDENTIFIER_VARIABLE} rdfs:subClassOf ?{CLASS_VARIABLE} ."));
        w.line(&format!(
            "FILTER(STRSTARTS(STR(?{CLASS_VARIABLE}), {}))",
            literal(BL)
        ));
        w.close();
        w.line(&format!(
            "OPTIONAL {{ ?{IDENTIFIER_VARIABLE} rdfs:label ?{LABEL_VARIABLE} . }}"
        ));
        w.finish(None)
    }

    fn slot_query(&self, aliases: &[(String, &str)]) -> String {
        let mut w = QueryWriter::new();
        w.select([ALIAS_VARIABLE, SLOT_VARIABLE, LABEL_VARIABLE]);
        self.values(&mut w, aliases.iter().map(|(a, id)| (a.as_str(), *id)));
        w.line(&format!(
            "?{SLOT_VARIABLE} <{SLOT_MAPPING}> ?{IDENTIFIER_VARIABLE} ."
        ));
        w.line(&format!(
            "OPTIONAL {{ ?{IDENTIFIER_VARIABLE} rdfs:label ?{LABEL_VARIABLE} . }}"
        ));
        w.finish(None)
    }

    fn values<'b>(&self, w: &mut QueryWriter, pairs: impl Iterator<Item = (&'b str, &'b str)>) {
        w.open(&format!("VALUES (?{IDENTIFIER_VARIABLE} ?{ALIAS_VARIABLE})"));
        for (alias, id) in pairs {
            w.line(&format!("( {} {} )", resource(self.table, id), literal(alias)));
        }
        w.close();
    }
}

fn alias(kind: char, idx: usize) -> String {
    format!("{kind}{idx:0width$}", width = ALIAS_WIDTH)
}

// =============================================================================
// PARSER
// =============================================================================

/// Merges detail lookup rows into a knowledge graph.
#[derive(Debug, Clone, Copy)]
pub struct DetailParser<'a> {
    table: &'a PrefixTable,
}

impl<'a> DetailParser<'a> {
    #[must_use]
    pub fn new(table: &'a PrefixTable) -> Self {
        Self { table }
    }

    /// Merge node and slot rows into `kgraph`.
    ///
    /// - every class row adds one underscore-convention type to its node
    /// - a label row sets the node name
    /// - a slot row sets the type of every edge under its relation alias
    ///
    /// Missing classes, labels or slots leave the fields as they are. A row
    /// without an alias is a decoding error; an unknown alias is ignored.
    pub fn merge(
        &self,
        kgraph: &mut KnowledgeGraph,
        node_rows: &[SolutionRow],
        slot_rows: &[SolutionRow],
        queries: &DetailQueries,
    ) -> Result<(), TmkpError> {
        for (idx, row) in node_rows.iter().enumerate() {
            let qid = &row.require(ALIAS_VARIABLE, idx)?.value;
            let Some(node) = queries
                .node_aliases
                .get(qid)
                .and_then(|id| kgraph.node_mut(id))
            else {
                continue;
            };
            if let Some(class) = row.value(CLASS_VARIABLE) {
                node.types
                    .insert(pascal_to_snake(&self.table.local_name(class)));
            }
            if let Some(label) = row.value(LABEL_VARIABLE) {
                node.name = Some(label.to_string());
            }
        }

        // First slot name in sorted order wins.
        let mut slots: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
        for (idx, row) in slot_rows.iter().enumerate() {
            let qid = &row.require(ALIAS_VARIABLE, idx)?.value;
            if let Some(slot) = row.value(SLOT_VARIABLE) {
                slots
                    .entry(qid.as_str())
                    .or_default()
                    .insert(self.table.local_name(slot));
            }
        }
        for (qid, names) in slots {
            let (Some(edge_ids), Some(slot)) = (queries.edge_aliases.get(qid), names.first())
            else {
                continue;
            };
            for edge_id in edge_ids {
                if let Some(edge) = kgraph.edge_mut(edge_id) {
                    edge.edge_type = slot.clone();
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Binding, KgEdge, KgNode};

    fn graph() -> KnowledgeGraph {
        let mut kgraph = KnowledgeGraph::new();
        kgraph.upsert_node(KgNode::new("PR:000031567"));
        kgraph.upsert_node(KgNode::new("CHEBI:3215"));
        kgraph.upsert_edge(KgEdge::new("RO:0002212", "CHEBI:3215", "PR:000031567"));
        kgraph.upsert_edge(KgEdge::new("RO:0002212", "CHEBI:9", "PR:000031567"));
        kgraph.upsert_edge(KgEdge::new("RO:0002213", "CHEBI:3215", "PR:000031567"));
        kgraph
    }

    #[test]
    fn aliases_follow_id_and_relation_order() {
        let table = PrefixTable::default();
        let queries = DetailQueryBuilder::new(&table).build(&graph());
        assert_eq!(queries.node_aliases["n0000"], "CHEBI:3215");
        assert_eq!(queries.node_aliases["n0001"], "PR:000031567");
        assert_eq!(queries.edge_aliases["e0000"].len(), 2);
        assert_eq!(queries.edge_aliases["e0001"].len(), 1);
    }

    #[test]
    fn node_query_batches_all_nodes() {
        let table = PrefixTable::default();
        let queries = DetailQueryBuilder::new(&table).build(&graph());
        assert!(queries.node_query.contains("SELECT DISTINCT ?qid ?blclass ?label WHERE {\n"));
        assert!(queries.node_query.contains("  VALUES (?kid ?qid) {\n"));
        assert!(queries.node_query.contains(
            "    ( <http://purl.obolibrary.org/obo/CHEBI_3215> \"n0000\" )\n"
        ));
        assert!(queries.node_query.contains(
            "    ( <http://purl.obolibrary.org/obo/PR_000031567> \"n0001\" )\n"
        ));
        assert!(queries.slot_query.contains(
            "    ( <http://purl.obolibrary.org/obo/RO_0002213> \"e0001\" )\n"
        ));
        assert!(queries.slot_query.contains(
            "  ?blslot <http://translator/text_mining_provider/slot_mapping> ?kid .\n"
        ));
    }

    #[test]
    fn merge_aggregates_classes_and_labels() {
        let table = PrefixTable::default();
        let mut kgraph = graph();
        let queries = DetailQueryBuilder::new(&table).build(&kgraph);
        let node_rows = [
            SolutionRow::new()
                .with("qid", Binding::literal("n0001"))
                .with("blclass", Binding::uri("https://w3id.org/biolink/vocab/GeneProduct")),
            SolutionRow::new()
                .with("qid", Binding::literal("n0001"))
                .with("blclass", Binding::uri("https://w3id.org/biolink/vocab/GeneOrGeneProduct")),
            SolutionRow::new()
                .with("qid", Binding::literal("n0001"))
                .with("blclass", Binding::uri("https://w3id.org/biolink/vocab/GeneProduct")),
            SolutionRow::new()
                .with("qid", Binding::literal("n0000"))
                .with("label", Binding::literal("bupivacaine")),
            SolutionRow::new().with("qid", Binding::literal("n9999")),
        ];
        DetailParser::new(&table)
            .merge(&mut kgraph, &node_rows, &[], &queries)
            .expect("merge");

        let protein = kgraph.node("PR:000031567").expect("protein");
        let types: Vec<&str> = protein.types.iter().map(String::as_str).collect();
        assert_eq!(types, ["gene_or_gene_product", "gene_product"]);
        assert_eq!(protein.name, None);
        assert_eq!(
            kgraph.node("CHEBI:3215").expect("chemical").name.as_deref(),
            Some("bupivacaine")
        );
    }

    #[test]
    fn slot_fans_out_to_every_edge_of_relation() {
        let table = PrefixTable::default();
        let mut kgraph = graph();
        let queries = DetailQueryBuilder::new(&table).build(&kgraph);
        let slot_rows = [SolutionRow::new().with("qid", Binding::literal("e0000")).with(
            "blslot",
            Binding::uri("https://w3id.org/biolink/vocab/negatively_regulates_entity_to_entity"),
        )];
        DetailParser::new(&table)
            .merge(&mut kgraph, &[], &slot_rows, &queries)
            .expect("merge");

        let types: Vec<&str> = kgraph.edges().map(|e| e.edge_type.as_str()).collect();
        assert_eq!(
            types
                .iter()
                .filter(|t| **t == "negatively_regulates_entity_to_entity")
                .count(),
            2
        );
        // No slot row: structural relation kept, edge kept.
        assert!(types.contains(&"RO:0002213"));
        assert_eq!(kgraph.edge_count(), 3);
    }

    #[test]
    fn row_without_alias_is_decoding_error() {
        let table = PrefixTable::default();
        let mut kgraph = graph();
        let queries = DetailQueryBuilder::new(&table).build(&kgraph);
        let rows = [SolutionRow::new().with("label", Binding::literal("x"))];
        let err = DetailParser::new(&table)
            .merge(&mut kgraph, &rows, &[], &queries)
            .expect_err("no qid");
        assert!(matches!(err, TmkpError::Decoding { row: 0, .. }));
    }
}
