//! # Pipeline
//!
//! Runs the three-phase protocol against a [`QueryExecutor`]:
//!
//! 1. Relation resolution and the structural match
//! 2. Evidence lookups (optional)
//! 3. Node and relation metadata
//!
//! Round trips inside one phase are independent and run concurrently, up to
//! the configured concurrency. Any failed round trip aborts the request and
//! nothing partial is returned.

use crate::config::DEFAULT_CONCURRENCY;
use crate::store::QueryExecutor;
use futures::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tmkp_core::{
    CompileOptions, CompiledQuery, DetailParser, DetailQueryBuilder, KnowledgeGraph, PrefixTable,
    QueryCompiler, QueryGraph, QueryResult, RelationMap, ResultBinder, SolutionRow, TmkpError,
};

/// A query graph together with its answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub query_graph: QueryGraph,
    pub knowledge_graph: KnowledgeGraph,
    pub results: Vec<QueryResult>,
}

impl Message {
    /// A message with no matches.
    #[must_use]
    pub fn empty(query_graph: QueryGraph) -> Self {
        Self {
            query_graph,
            knowledge_graph: KnowledgeGraph::new(),
            results: Vec::new(),
        }
    }
}

/// Shared, cheaply clonable pipeline handle.
#[derive(Clone)]
pub struct Pipeline {
    executor: Arc<dyn QueryExecutor>,
    prefixes: Arc<PrefixTable>,
    evidence: bool,
    concurrency: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(executor: Arc<dyn QueryExecutor>, prefixes: Arc<PrefixTable>) -> Self {
        Self {
            executor,
            prefixes,
            evidence: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: bool) -> Self {
        self.evidence = evidence;
        self
    }

    /// Round trips in flight per phase. Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    #[must_use]
    pub fn evidence(&self) -> bool {
        self.evidence
    }

    // =========================================================================
    // PHASE 1: COMPILE + STRUCTURAL MATCH
    // =========================================================================

    /// Resolve every distinct edge type to its concrete relation identifiers.
    ///
    /// An empty resolution is logged and kept: it compiles to a constraint
    /// that can never match.
    pub async fn resolve_relations(&self, qgraph: &QueryGraph) -> Result<RelationMap, TmkpError> {
        let compiler = QueryCompiler::new(&self.prefixes);
        let lookups = compiler.relation_types(qgraph).into_iter().map(|edge_type| {
            let query = compiler.relation_query(&edge_type);
            async move {
                let rows = self.executor.select(&query).await?;
                let relations = compiler.parse_relations(&rows)?;
                if relations.is_empty() {
                    tracing::warn!(
                        event = "relation_resolution_empty",
                        edge_type = %edge_type,
                        "Edge type resolved to no relations; the query cannot match"
                    );
                }
                Ok::<_, TmkpError>((edge_type, relations))
            }
        });

        let resolved: Vec<(String, Vec<String>)> = stream::iter(lookups)
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;
        Ok(resolved.into_iter().collect())
    }

    /// Validate, resolve relations and compile.
    pub async fn transpile(
        &self,
        qgraph: &QueryGraph,
        options: CompileOptions,
    ) -> Result<CompiledQuery, TmkpError> {
        qgraph.validate()?;
        let relations = self.resolve_relations(qgraph).await?;
        QueryCompiler::new(&self.prefixes).compile(qgraph, &relations, options)
    }

    /// Answer a query graph end to end.
    pub async fn answer(
        &self,
        qgraph: QueryGraph,
        options: CompileOptions,
    ) -> Result<Message, TmkpError> {
        let compiled = self.transpile(&qgraph, options).await?;
        let rows = self.executor.select(&compiled.text).await?;
        tracing::info!(
            rows = rows.len(),
            strict = options.strict,
            nodes = qgraph.nodes.len(),
            edges = qgraph.edges.len(),
            "Structural match complete"
        );
        if rows.is_empty() {
            return Ok(Message::empty(qgraph));
        }

        let binder = ResultBinder::new(&self.prefixes);
        let (mut knowledge_graph, mut results) = binder.bind(&rows, &qgraph)?;

        if self.evidence {
            self.attach_evidence(&rows, &qgraph, options.strict, &mut results)
                .await?;
        }
        self.enrich(&mut knowledge_graph).await?;

        tracing::info!(
            kg_nodes = knowledge_graph.node_count(),
            kg_edges = knowledge_graph.edge_count(),
            results = results.len(),
            "Query answered"
        );
        Ok(Message {
            query_graph: qgraph,
            knowledge_graph,
            results,
        })
    }

    // =========================================================================
    // PHASE 2: EVIDENCE
    // =========================================================================

    /// One lookup per distinct bound triple, fanned back out to its bindings.
    async fn attach_evidence(
        &self,
        rows: &[SolutionRow],
        qgraph: &QueryGraph,
        strict: bool,
        results: &mut [QueryResult],
    ) -> Result<(), TmkpError> {
        let binder = ResultBinder::new(&self.prefixes);
        let requests = binder.evidence_requests(rows, qgraph, strict)?;
        tracing::debug!(lookups = requests.len(), "Fetching evidence");

        let lookups = requests.into_iter().map(|request| {
            let query = binder.evidence_query(&request.key);
            async move {
                let rows = self.executor.select(&query).await?;
                Ok::<_, TmkpError>((request, rows))
            }
        });
        let fetched: Vec<_> = stream::iter(lookups)
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        for (request, evidence_rows) in fetched {
            let records = binder.parse_evidence(&evidence_rows);
            binder.attach_evidence(results, &request, &records);
        }
        Ok(())
    }

    // =========================================================================
    // PHASE 3: METADATA
    // =========================================================================

    /// Batched node and relation metadata, merged in place.
    async fn enrich(&self, kgraph: &mut KnowledgeGraph) -> Result<(), TmkpError> {
        let queries = DetailQueryBuilder::new(&self.prefixes).build(kgraph);
        let (node_rows, slot_rows) = tokio::try_join!(
            self.executor.select(&queries.node_query),
            self.executor.select(&queries.slot_query)
        )?;
        DetailParser::new(&self.prefixes).merge(kgraph, &node_rows, &slot_rows, &queries)
    }
}
