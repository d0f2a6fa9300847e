//! # tmkp - Text-Mined Knowledge Provider
//!
//! The main binary for the tmkp query-graph translator.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for translation and prefix operations
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    apps/tmkp (THE BINARY)                  │
//! │                                                            │
//! │  ┌─────────────┐    ┌─────────────┐    ┌───────────────┐  │
//! │  │    CLI      │    │  HTTP API   │    │ Store adapter │  │
//! │  │   (clap)    │    │   (axum)    │    │   (reqwest)   │  │
//! │  └──────┬──────┘    └──────┬──────┘    └───────▲───────┘  │
//! │         └──────────┬───────┘                   │          │
//! │                    ▼                           │          │
//! │             ┌─────────────┐                    │          │
//! │             │  Pipeline   │────────────────────┘          │
//! │             └──────┬──────┘                               │
//! │                    ▼                                      │
//! │             ┌─────────────┐                               │
//! │             │  tmkp-core  │                               │
//! │             │ (THE LOGIC) │                               │
//! │             └─────────────┘                               │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! tmkp server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! tmkp transpile -f query.json --lenient
//! tmkp query -f query.json --evidence
//! tmkp compact http://purl.obolibrary.org/obo/CHEBI_3215
//! ```

use clap::Parser;
use tmkp::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // TMKP_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("TMKP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tmkp=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the tmkp startup banner.
fn print_banner() {
    eprintln!(
        r#"
  ████████╗███╗   ███╗██╗  ██╗██████╗
  ╚══██╔══╝████╗ ████║██║ ██╔╝██╔══██╗
     ██║   ██╔████╔██║█████╔╝ ██████╔╝
     ██║   ██║╚██╔╝██║██╔═██╗ ██╔═══╝
     ██║   ██║ ╚═╝ ██║██║  ██╗██║
     ╚═╝   ╚═╝     ╚═╝╚═╝  ╚═╝╚═╝

  Text-Mined Knowledge Provider v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
