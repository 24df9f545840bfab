//! Analyzer configuration
//!
//! Config is resolved in order:
//! 1. Override file in data dir (~/.local/share/invparse/config/analyzer.toml),
//!    else the embedded default (compiled into binary)
//! 2. `INVPARSE_*` environment variables on top

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analyzer.toml");

pub const ANALYZER_ENV: &str = "INVPARSE_ANALYZER";
pub const ENDPOINT_ENV: &str = "INVPARSE_ANALYZER_ENDPOINT";
pub const TOKEN_ENV: &str = "INVPARSE_ANALYZER_TOKEN";
pub const COMPARTMENT_ENV: &str = "INVPARSE_COMPARTMENT_ID";
pub const TIMEOUT_ENV: &str = "INVPARSE_ANALYZER_TIMEOUT_SECS";

/// Which analyzer implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyzerBackend {
    #[default]
    Http,
    Mock,
}

impl AnalyzerBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for AnalyzerBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" | "oci" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            other => Err(format!("Unknown analyzer backend: {}", other)),
        }
    }
}

/// Resolved analyzer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub backend: AnalyzerBackend,
    /// Base URL of the analysis service (required for the http backend)
    pub endpoint: Option<String>,
    /// Opaque bearer token
    pub token: Option<String>,
    pub compartment_id: Option<String>,
    /// Timeout for a single analysis request
    pub timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            backend: AnalyzerBackend::Http,
            endpoint: None,
            token: None,
            compartment_id: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl AnalyzerConfig {
    /// Load from the default override location (if present) and the environment
    pub fn load() -> Result<Self> {
        let mut config = load_config(default_config_path().as_deref())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `INVPARSE_*` overrides using the given variable lookup.
    ///
    /// Empty values are treated as unset. Unparseable values are ignored
    /// with a warning so a typo never prevents startup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = get(ANALYZER_ENV) {
            match backend.parse() {
                Ok(b) => self.backend = b,
                Err(e) => tracing::warn!(error = %e, "Ignoring {}", ANALYZER_ENV),
            }
        }
        if let Some(endpoint) = get(ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        if let Some(token) = get(TOKEN_ENV) {
            self.token = Some(token);
        }
        if let Some(compartment) = get(COMPARTMENT_ENV) {
            self.compartment_id = Some(compartment);
        }
        if let Some(timeout) = get(TIMEOUT_ENV) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => self.timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!(value = %timeout, "Ignoring {}", TIMEOUT_ENV),
            }
        }
    }
}

/// Get the default override config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("invparse").join("config").join("analyzer.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AnalyzerConfig> {
    let content = match override_path {
        Some(path) if path.exists() => fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    analyzer: Option<RawAnalyzer>,
}

#[derive(Debug, Deserialize)]
struct RawAnalyzer {
    backend: Option<String>,
    endpoint: Option<String>,
    token: Option<String>,
    compartment_id: Option<String>,
    timeout_secs: Option<u64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AnalyzerConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalyzerConfig::default();

    if let Some(analyzer) = raw.analyzer {
        if let Some(backend) = analyzer.backend {
            config.backend = backend.parse().map_err(Error::Config)?;
        }
        config.endpoint = analyzer.endpoint.filter(|s| !s.is_empty());
        config.token = analyzer.token.filter(|s| !s.is_empty());
        config.compartment_id = analyzer.compartment_id.filter(|s| !s.is_empty());
        if let Some(timeout) = analyzer.timeout_secs {
            config.timeout = Duration::from_secs(timeout);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.backend, AnalyzerBackend::Http);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [analyzer]
            backend = "mock"
            endpoint = "https://document.example.com/20221109"
            compartment_id = "ocid1.compartment.test"
            timeout_secs = 15
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, AnalyzerBackend::Mock);
        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://document.example.com/20221109")
        );
        assert_eq!(config.compartment_id.as_deref(), Some("ocid1.compartment.test"));
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_backend_rejected() {
        let err = parse_config("[analyzer]\nbackend = \"carrier-pigeon\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ANALYZER_ENV, "mock"),
            (ENDPOINT_ENV, "http://localhost:9000"),
            (TOKEN_ENV, ""),
            (TIMEOUT_ENV, "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AnalyzerConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.backend, AnalyzerBackend::Mock);
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_override_file_uses_default() {
        let config = load_config(Some(Path::new("/nonexistent/analyzer.toml"))).unwrap();
        assert_eq!(config, parse_config(DEFAULT_CONFIG).unwrap());
    }
}
