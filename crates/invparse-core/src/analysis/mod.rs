//! Pluggable document analysis backend abstraction
//!
//! This module provides a backend-agnostic interface to the remote
//! document-understanding service that classifies an uploaded PDF and
//! extracts its key/value fields.
//!
//! # Architecture
//!
//! - `DocumentAnalyzer` trait: defines the interface for all analyzers
//! - `AnalyzerClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `HttpAnalyzer`, `MockAnalyzer`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = AnalyzerConfig::load()?;
//! let analyzer = AnalyzerClient::from_config(&config)?;
//! let raw = analyzer.analyze(&pdf_bytes).await?;
//! ```

mod http;
mod mock;
pub mod types;

pub use http::HttpAnalyzer;
pub use mock::{sample_invoice, MockAnalyzer};
pub use types::*;

use async_trait::async_trait;

use crate::config::{AnalyzerBackend, AnalyzerConfig};
use crate::error::{Error, Result};

/// Trait defining the interface for all document analyzers
///
/// Any failure, whatever its cause, is reported as `Error::RemoteUnavailable`.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Run key/value extraction and classification on a document
    async fn analyze(&self, document: &[u8]) -> Result<RawAnalysisResult>;

    /// Get the service location (for logging)
    fn host(&self) -> &str;
}

/// Concrete analyzer client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AnalyzerClient {
    /// Remote analysis service over HTTP
    Http(HttpAnalyzer),
    /// Canned results for testing
    Mock(MockAnalyzer),
}

impl AnalyzerClient {
    /// Build the analyzer selected by the configuration
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        match config.backend {
            AnalyzerBackend::Http => HttpAnalyzer::from_config(config).map(AnalyzerClient::Http),
            AnalyzerBackend::Mock => Ok(AnalyzerClient::Mock(MockAnalyzer::invoice())),
        }
    }

    /// Build from the default config file and environment
    pub fn from_env() -> Result<Self> {
        let config = AnalyzerConfig::load()?;
        Self::from_config(&config)
    }

    /// Create a mock analyzer returning the given result
    pub fn mock(result: RawAnalysisResult) -> Self {
        AnalyzerClient::Mock(MockAnalyzer::returning(result))
    }

    /// Create a mock analyzer that always fails
    pub fn failing() -> Self {
        AnalyzerClient::Mock(MockAnalyzer::failing())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            AnalyzerClient::Http(_) => AnalyzerBackend::Http.as_str(),
            AnalyzerClient::Mock(_) => AnalyzerBackend::Mock.as_str(),
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for AnalyzerClient {
    async fn analyze(&self, document: &[u8]) -> Result<RawAnalysisResult> {
        match self {
            AnalyzerClient::Http(b) => b.analyze(document).await,
            AnalyzerClient::Mock(b) => b.analyze(document).await,
        }
    }

    fn host(&self) -> &str {
        match self {
            AnalyzerClient::Http(b) => b.host(),
            AnalyzerClient::Mock(b) => b.host(),
        }
    }
}

/// Map any backend failure to the uniform unavailable error
pub(crate) fn unavailable(err: impl std::fmt::Display) -> Error {
    Error::RemoteUnavailable(err.to_string())
}
