//! # tmkp
//!
//! The async application around [`tmkp_core`]: the store adapter, the
//! three-phase pipeline, the HTTP API and the CLI.
//!
//! ```text
//! query graph ──► Pipeline ──► QueryExecutor (SPARQL store)
//!                    │
//!                    └──► tmkp-core (compile / bind / merge)
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod store;
