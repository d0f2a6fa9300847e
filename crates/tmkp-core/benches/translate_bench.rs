//! # Translator Benchmarks
//!
//! Performance benchmarks for tmkp-core compile and decode paths.
//!
//! Run with: `cargo bench -p tmkp-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tmkp_core::{
    Binding, CompileOptions, DetailQueryBuilder, PrefixTable, QueryCompiler, QueryEdge,
    QueryGraph, QueryNode, RelationMap, ResultBinder, SolutionRow, edge_id,
};

/// A chain n0 - n1 - ... - n(size-1) of typed nodes.
fn chain_graph(size: usize) -> QueryGraph {
    let nodes = (0..size)
        .map(|i| QueryNode::new(format!("n{i}")).with_type("gene_product"))
        .collect();
    let edges = (1..size)
        .map(|i| {
            QueryEdge::new(format!("e{i}"), format!("n{}", i - 1), format!("n{i}"))
                .with_type("affects")
        })
        .collect();
    QueryGraph::new(nodes, edges)
}

fn relations() -> RelationMap {
    let mut map = RelationMap::new();
    map.insert(
        "affects".to_string(),
        (0..20)
            .map(|i| format!("http://purl.obolibrary.org/obo/RO_00022{i:02}"))
            .collect(),
    );
    map
}

/// Rows binding every chain node to one of `spread` classes.
fn chain_rows(qgraph: &QueryGraph, count: usize, spread: usize) -> Vec<SolutionRow> {
    (0..count)
        .map(|r| {
            let mut row = SolutionRow::new();
            for (i, node) in qgraph.nodes.iter().enumerate() {
                row = row.with(
                    format!("{}_type", node.id),
                    Binding::uri(format!(
                        "http://purl.obolibrary.org/obo/PR_{}",
                        (r + i) % spread
                    )),
                );
            }
            for edge in &qgraph.edges {
                row = row.with(
                    edge.id.clone(),
                    Binding::uri("http://purl.obolibrary.org/obo/RO_0002212"),
                );
            }
            row
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_compile(c: &mut Criterion) {
    let table = PrefixTable::default();
    let compiler = QueryCompiler::new(&table);
    let relations = relations();
    let mut group = c.benchmark_group("compile");

    for size in [2, 8, 32].iter() {
        let qgraph = chain_graph(*size);
        group.bench_with_input(BenchmarkId::new("strict", size), &qgraph, |b, g| {
            b.iter(|| black_box(compiler.compile(g, &relations, CompileOptions::default())));
        });
        group.bench_with_input(BenchmarkId::new("lenient", size), &qgraph, |b, g| {
            b.iter(|| black_box(compiler.compile(g, &relations, CompileOptions::lenient())));
        });
    }

    group.finish();
}

fn bench_bind(c: &mut Criterion) {
    let table = PrefixTable::default();
    let binder = ResultBinder::new(&table);
    let qgraph = chain_graph(4);
    let mut group = c.benchmark_group("bind");

    for count in [100, 1000, 10000].iter() {
        let rows = chain_rows(&qgraph, *count, 50);
        group.bench_with_input(BenchmarkId::from_parameter(count), &rows, |b, rows| {
            b.iter(|| black_box(binder.bind(rows, &qgraph)));
        });
    }

    group.finish();
}

fn bench_detail_queries(c: &mut Criterion) {
    let table = PrefixTable::default();
    let qgraph = chain_graph(4);
    let rows = chain_rows(&qgraph, 1000, 500);
    let Ok((kgraph, _)) = ResultBinder::new(&table).bind(&rows, &qgraph) else {
        return;
    };
    let builder = DetailQueryBuilder::new(&table);

    c.bench_function("detail_queries", |b| {
        b.iter(|| black_box(builder.build(&kgraph)));
    });
}

fn bench_edge_id(c: &mut Criterion) {
    c.bench_function("edge_id", |b| {
        b.iter(|| {
            black_box(edge_id(
                black_box("RO:0002212"),
                black_box("CHEBI:3215"),
                black_box("PR:000031567"),
            ))
        });
    });
}

fn bench_compact(c: &mut Criterion) {
    let table = PrefixTable::default();
    // Late entry: worst case for first-match scanning.
    let iri = "http://id.nlm.nih.gov/mesh/D000001";
    c.bench_function("compact_last_entry", |b| {
        b.iter(|| black_box(table.compact(black_box(iri))));
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_bind,
    bench_detail_queries,
    bench_edge_id,
    bench_compact
);
criterion_main!(benches);
