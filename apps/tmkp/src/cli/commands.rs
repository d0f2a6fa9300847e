//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState, QueryInput};
use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::store::SparqlClient;
use std::path::Path;
use std::sync::Arc;
use tmkp_core::{CompileOptions, QueryGraph, TmkpError, relaxations};

// =============================================================================
// INPUT
// =============================================================================

/// Maximum query graph file size (10 MB).
const MAX_QUERY_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read a query graph file: a bare graph or a `{"message": {"query_graph"}}`
/// envelope.
pub fn read_query_graph(path: &Path) -> Result<QueryGraph, TmkpError> {
    let canonical = path.canonicalize().map_err(|e| {
        TmkpError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;
    if !canonical.is_file() {
        return Err(TmkpError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| TmkpError::Io(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_QUERY_FILE_SIZE {
        return Err(TmkpError::Serialization(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_QUERY_FILE_SIZE
        )));
    }

    let text = std::fs::read_to_string(&canonical)
        .map_err(|e| TmkpError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
    let input: QueryInput = serde_json::from_str(&text)
        .map_err(|e| TmkpError::Serialization(format!("Invalid query graph: {}", e)))?;
    Ok(input.into_query_graph())
}

/// Store client, prefix table and pipeline settings from `config`.
pub fn build_pipeline(config: &AppConfig) -> Result<Pipeline, TmkpError> {
    let client = SparqlClient::from_config(&config.store)?;
    let prefixes = config.prefix_table()?;
    Ok(Pipeline::new(Arc::new(client), Arc::new(prefixes))
        .with_evidence(config.pipeline.evidence)
        .with_concurrency(config.pipeline.concurrency))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), TmkpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| TmkpError::Serialization(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: AppConfig, host: &str, port: u16) -> Result<(), TmkpError> {
    let pipeline = build_pipeline(&config)?;

    println!("tmkp Query Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Store:    {}", config.store.url);
    println!(
        "  Prefixes: {} ({} entries)",
        pipeline.prefixes().version(),
        pipeline.prefixes().len()
    );
    println!("  Evidence: {}", pipeline.evidence());
    println!();
    println!("Endpoints:");
    println!("  POST /query     - Answer a query graph");
    println!("  POST /transpile - Compile a query graph to SPARQL");
    println!("  POST /subquery  - Relax a query graph by one edge");
    println!("  GET  /status    - Translator status");
    println!("  GET  /health    - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, AppState::new(pipeline, config)).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store endpoint and prefix table.
pub fn cmd_status(config: &AppConfig, json_mode: bool) -> Result<(), TmkpError> {
    let prefixes = config.prefix_table()?;

    if json_mode {
        return print_json(&serde_json::json!({
            "sparql_endpoint": config.store.url,
            "prefix_table_version": prefixes.version(),
            "prefix_count": prefixes.len(),
            "evidence": config.pipeline.evidence,
            "concurrency": config.pipeline.concurrency,
        }));
    }

    println!("tmkp Status");
    println!("===========");
    println!("Store:        {}", config.store.url);
    println!(
        "Timeout:      {}",
        config
            .store
            .timeout_secs
            .filter(|s| *s > 0)
            .map_or_else(|| "none".to_string(), |s| format!("{}s", s))
    );
    println!();
    println!("Prefix table: {}", prefixes.version());
    println!("Entries:      {}", prefixes.len());
    println!("Evidence:     {}", config.pipeline.evidence);
    println!("Concurrency:  {}", config.pipeline.concurrency);

    Ok(())
}

// =============================================================================
// TRANSPILE COMMAND
// =============================================================================

/// Compile a query graph file to SPARQL.
pub async fn cmd_transpile(
    config: &AppConfig,
    json_mode: bool,
    path: &Path,
    options: CompileOptions,
) -> Result<(), TmkpError> {
    let qgraph = read_query_graph(path)?;
    let compiled = build_pipeline(config)?.transpile(&qgraph, options).await?;

    if json_mode {
        return print_json(&serde_json::json!({
            "query": compiled.text,
            "variables": compiled.variables,
        }));
    }

    print!("{}", compiled.text);
    Ok(())
}

// =============================================================================
// QUERY COMMAND
// =============================================================================

/// Answer a query graph file. Always prints the JSON message.
pub async fn cmd_query(
    config: AppConfig,
    path: &Path,
    options: CompileOptions,
    evidence: bool,
) -> Result<(), TmkpError> {
    let qgraph = read_query_graph(path)?;
    let mut pipeline = build_pipeline(&config)?;
    if evidence {
        pipeline = pipeline.with_evidence(true);
    }
    let message = pipeline.answer(qgraph, options).await?;
    print_json(&message)
}

// =============================================================================
// SUBQUERY COMMAND
// =============================================================================

/// Print every one-edge relaxation of a query graph file.
pub fn cmd_subquery(json_mode: bool, path: &Path) -> Result<(), TmkpError> {
    let qgraph = read_query_graph(path)?;
    qgraph.validate()?;
    let relaxed: Vec<QueryGraph> = relaxations(&qgraph).collect();

    if json_mode {
        return print_json(&relaxed);
    }

    if relaxed.is_empty() {
        println!("No relaxation available (no edges, or every edge touches a pinned node)");
        return Ok(());
    }
    for (idx, graph) in relaxed.iter().enumerate() {
        let dropped: Vec<&str> = qgraph
            .edges
            .iter()
            .filter(|e| !graph.edges.iter().any(|kept| kept.id == e.id))
            .map(|e| e.id.as_str())
            .collect();
        let kept: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
        println!(
            "{}. drop {} -> edges [{}]",
            idx + 1,
            dropped.join(", "),
            kept.join(", ")
        );
    }
    Ok(())
}

// =============================================================================
// PREFIX COMMANDS
// =============================================================================

/// Compact an IRI.
pub fn cmd_compact(config: &AppConfig, json_mode: bool, iri: &str) -> Result<(), TmkpError> {
    let compacted = config.prefix_table()?.compact(iri);
    if json_mode {
        return print_json(&serde_json::json!({ "iri": iri, "curie": compacted }));
    }
    println!("{}", compacted);
    Ok(())
}

/// Expand a CURIE.
pub fn cmd_expand(config: &AppConfig, json_mode: bool, curie: &str) -> Result<(), TmkpError> {
    let expanded = config.prefix_table()?.expand(curie);
    if json_mode {
        return print_json(&serde_json::json!({ "curie": curie, "iri": expanded }));
    }
    println!("{}", expanded);
    Ok(())
}

/// List the prefix table in match order.
pub fn cmd_prefixes(config: &AppConfig, json_mode: bool) -> Result<(), TmkpError> {
    let table = config.prefix_table()?;

    if json_mode {
        let entries: Vec<serde_json::Value> = table
            .entries()
            .map(|(short, stem)| serde_json::json!({ "short": short, "stem": stem }))
            .collect();
        return print_json(&serde_json::json!({
            "version": table.version(),
            "prefixes": entries,
        }));
    }

    println!("Prefix table {} ({} entries)", table.version(), table.len());
    let width = table.entries().map(|(short, _)| short.len()).max().unwrap_or(0);
    for (short, stem) in table.entries() {
        println!("  {:<width$}  {}", short, stem, width = width);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
