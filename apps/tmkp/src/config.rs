//! # Configuration
//!
//! Application settings, loaded in three layers (later wins):
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config`)
//! 3. Environment variables
//!
//! ## Environment Variables
//!
//! - `TMKP_SPARQL_URL`: SPARQL endpoint of the store
//! - `TMKP_SPARQL_TOKEN`: Bearer token sent to the store
//! - `TMKP_TIMEOUT_SECS`: Per-request store timeout (0 disables)
//! - `TMKP_PREFIX_TABLE`: Path to a prefix table TOML document
//! - `TMKP_EVIDENCE`: Fetch per-edge evidence (`true`/`false`)
//! - `TMKP_API_KEY`: If set, the HTTP API requires this Bearer token
//! - `TMKP_RATE_LIMIT`: Requests per second (0 disables)
//! - `TMKP_CORS_ORIGINS`: Comma-separated origins, or `*`

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tmkp_core::{PrefixTable, TmkpError};

/// Default SPARQL endpoint.
pub const DEFAULT_SPARQL_URL: &str = "http://localhost:7200/repositories/tmkp";

/// Default rate limit: 100 requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Default number of store round trips in flight per phase.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Maximum size of a configuration or prefix table file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// Full application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
}

/// `[store]`: how to reach the triple store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub url: String,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SPARQL_URL.to_string(),
            token: None,
            timeout_secs: None,
        }
    }
}

impl StoreConfig {
    /// The request timeout, if one is configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// `[pipeline]`: translation behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub evidence: bool,
    pub concurrency: usize,
    pub prefix_table: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            evidence: false,
            concurrency: DEFAULT_CONCURRENCY,
            prefix_table: None,
        }
    }
}

/// `[server]`: HTTP API security settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub api_key: Option<String>,
    pub rate_limit: u32,
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: None,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl AppConfig {
    /// Parse a TOML configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, TmkpError> {
        toml::from_str(text).map_err(|e| TmkpError::Config(format!("Invalid config: {e}")))
    }

    /// Load defaults, then `path` (if any), then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, TmkpError> {
        let mut config = match path {
            Some(path) => Self::from_toml_str(&read_small_file(path)?)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `TMKP_*` overrides from `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), TmkpError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("TMKP_SPARQL_URL") {
            self.store.url = url;
        }
        if let Some(token) = var("TMKP_SPARQL_TOKEN") {
            self.store.token = Some(token);
        }
        if let Some(secs) = var("TMKP_TIMEOUT_SECS") {
            self.store.timeout_secs = Some(parse_number("TMKP_TIMEOUT_SECS", &secs)?);
        }
        if let Some(path) = var("TMKP_PREFIX_TABLE") {
            self.pipeline.prefix_table = Some(PathBuf::from(path));
        }
        if let Some(flag) = var("TMKP_EVIDENCE") {
            self.pipeline.evidence = parse_flag("TMKP_EVIDENCE", &flag)?;
        }
        if let Some(key) = var("TMKP_API_KEY") {
            self.server.api_key = Some(key);
        }
        if let Some(rps) = var("TMKP_RATE_LIMIT") {
            self.server.rate_limit = parse_number("TMKP_RATE_LIMIT", &rps)?;
        }
        if let Some(origins) = var("TMKP_CORS_ORIGINS") {
            self.server.cors_origins = Some(origins);
        }
        Ok(())
    }

    /// The configured prefix table, or the built-in one.
    pub fn prefix_table(&self) -> Result<PrefixTable, TmkpError> {
        match &self.pipeline.prefix_table {
            Some(path) => PrefixTable::from_toml_str(&read_small_file(path)?),
            None => Ok(PrefixTable::default()),
        }
    }
}

fn read_small_file(path: &Path) -> Result<String, TmkpError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| TmkpError::Io(format!("Cannot read '{}': {e}", path.display())))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(TmkpError::Config(format!(
            "File '{}' is {} bytes, maximum is {} bytes",
            path.display(),
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| TmkpError::Io(format!("Cannot read '{}': {e}", path.display())))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, TmkpError> {
    value
        .trim()
        .parse()
        .map_err(|_| TmkpError::Config(format!("{key} must be a non-negative integer, got {value:?}")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, TmkpError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TmkpError::Config(format!("{key} must be a boolean, got {value:?}"))),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.store.url, DEFAULT_SPARQL_URL);
        assert_eq!(config.server.rate_limit, DEFAULT_RATE_LIMIT);
        assert_eq!(config.pipeline.concurrency, DEFAULT_CONCURRENCY);
        assert!(!config.pipeline.evidence);
        assert!(config.store.timeout().is_none());
    }

    #[test]
    fn toml_sections_are_partial() {
        let config = AppConfig::from_toml_str(
            r#"
            [store]
            url = "http://store:7200/repositories/kg"
            timeout_secs = 30

            [pipeline]
            evidence = true
            "#,
        )
        .expect("parse");
        assert_eq!(config.store.url, "http://store:7200/repositories/kg");
        assert_eq!(config.store.timeout(), Some(Duration::from_secs(30)));
        assert!(config.pipeline.evidence);
        assert_eq!(config.pipeline.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = AppConfig::from_toml_str("[store]\nendpoint = \"x\"\n").expect_err("reject");
        assert!(matches!(err, TmkpError::Config(_)));
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = AppConfig::from_toml_str("[store]\nurl = \"http://file\"\n").expect("parse");
        config
            .apply_overrides(env(&[
                ("TMKP_SPARQL_URL", "http://env"),
                ("TMKP_EVIDENCE", "yes"),
                ("TMKP_RATE_LIMIT", "0"),
                ("TMKP_API_KEY", ""),
            ]))
            .expect("overrides");
        assert_eq!(config.store.url, "http://env");
        assert!(config.pipeline.evidence);
        assert_eq!(config.server.rate_limit, 0);
        assert!(config.server.api_key.is_none());
    }

    #[test]
    fn malformed_environment_is_a_config_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(env(&[("TMKP_TIMEOUT_SECS", "soon")]))
            .expect_err("reject");
        assert!(matches!(err, TmkpError::Config(_)));

        let err = config
            .apply_overrides(env(&[("TMKP_EVIDENCE", "maybe")]))
            .expect_err("reject");
        assert!(matches!(err, TmkpError::Config(_)));
    }

    #[test]
    fn prefix_table_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefixes.toml");
        std::fs::write(
            &path,
            "version = \"test-1\"\n\n[[prefix]]\nshort = \"EX\"\nstem = \"http://example.org/\"\n",
        )
        .expect("write");

        let mut config = AppConfig::default();
        config.pipeline.prefix_table = Some(path);
        let table = config.prefix_table().expect("table");
        assert_eq!(table.version(), "test-1");
        assert_eq!(table.compact("http://example.org/x"), "EX:x");
    }

    #[test]
    fn missing_prefix_table_is_io_error() {
        let mut config = AppConfig::default();
        config.pipeline.prefix_table = Some(PathBuf::from("/nonexistent/prefixes.toml"));
        assert!(matches!(config.prefix_table(), Err(TmkpError::Io(_))));
    }
}
