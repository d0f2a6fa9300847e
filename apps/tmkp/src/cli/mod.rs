//! # tmkp CLI Module
//!
//! This module implements the CLI interface for tmkp.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show store endpoint and prefix table
//! - `transpile` - Compile a query graph file to SPARQL
//! - `query` - Answer a query graph file against the store
//! - `subquery` - Relax a query graph file by one edge
//! - `compact` - Compact an IRI to a CURIE
//! - `expand` - Expand a CURIE to an IRI
//! - `prefixes` - List the prefix table

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tmkp_core::{CompileOptions, TmkpError};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// tmkp - Text-Mined Knowledge Provider
///
/// Translates biomedical query graphs into SPARQL and answers them against
/// a triple store of text-mined assertions.
#[derive(Parser, Debug)]
#[command(name = "tmkp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Compilation flags shared by `transpile` and `query`.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct CompileArgs {
    /// Lenient matching: edge-local endpoint instances
    #[arg(long)]
    pub lenient: bool,

    /// Result cap (negative for unbounded)
    #[arg(short, long, default_value = "-1", allow_negative_numbers = true)]
    pub limit: i64,
}

impl CompileArgs {
    #[must_use]
    pub fn options(&self) -> CompileOptions {
        CompileOptions {
            strict: !self.lenient,
            limit: None,
        }
        .with_signed_limit(self.limit)
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Show store endpoint and prefix table
    Status,

    /// Compile a query graph to SPARQL (resolves edge types against the store)
    Transpile {
        /// Query graph JSON file (bare graph or {"message": {"query_graph": ...}})
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        compile: CompileArgs,
    },

    /// Answer a query graph against the store
    Query {
        /// Query graph JSON file (bare graph or {"message": {"query_graph": ...}})
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        compile: CompileArgs,

        /// Fetch per-edge evidence (overrides configuration)
        #[arg(short, long)]
        evidence: bool,
    },

    /// Relax a query graph by one edge
    Subquery {
        /// Query graph JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Compact an IRI against the prefix table
    Compact {
        /// Full IRI
        iri: String,
    },

    /// Expand a CURIE against the prefix table
    Expand {
        /// Compact identifier, e.g. CHEBI:3215
        curie: String,
    },

    /// List the prefix table in order
    Prefixes,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), TmkpError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, &host, port).await,
        Some(Commands::Status) | None => cmd_status(&config, json_mode),
        Some(Commands::Transpile { file, compile }) => {
            cmd_transpile(&config, json_mode, &file, compile.options()).await
        }
        Some(Commands::Query {
            file,
            compile,
            evidence,
        }) => cmd_query(config, &file, compile.options(), evidence).await,
        Some(Commands::Subquery { file }) => cmd_subquery(json_mode, &file),
        Some(Commands::Compact { iri }) => cmd_compact(&config, json_mode, &iri),
        Some(Commands::Expand { curie }) => cmd_expand(&config, json_mode, &curie),
        Some(Commands::Prefixes) => cmd_prefixes(&config, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tmkp", "prefixes", "--json", "-q"]).expect("parse");
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Commands::Prefixes)));
    }

    #[test]
    fn compile_flags() {
        let cli = Cli::try_parse_from(["tmkp", "transpile", "-f", "q.json", "--lenient", "-l", "10"])
            .expect("parse");
        let compile = match cli.command {
            Some(Commands::Transpile { compile, .. }) => Some(compile),
            _ => None,
        }
        .expect("transpile command");
        let options = compile.options();
        assert!(!options.strict);
        assert_eq!(options.limit, Some(10));
    }

    #[test]
    fn negative_limit_is_unbounded() {
        let cli = Cli::try_parse_from(["tmkp", "query", "-f", "q.json", "--limit", "-1"])
            .expect("parse");
        let (compile, evidence) = match cli.command {
            Some(Commands::Query {
                compile, evidence, ..
            }) => Some((compile, evidence)),
            _ => None,
        }
        .expect("query command");
        assert!(compile.options().strict);
        assert_eq!(compile.options().limit, None);
        assert!(!evidence);
    }
}
