//! HTTP document analysis backend
//!
//! Calls the remote document-understanding service's analyze-document action
//! with the PDF inlined as base64 and the key/value extraction plus
//! classification features enabled.
//!
//! # Configuration
//!
//! - `INVPARSE_ANALYZER_ENDPOINT`: Service base URL (required)
//! - `INVPARSE_ANALYZER_TOKEN`: Bearer token (optional)
//! - `INVPARSE_COMPARTMENT_ID`: Compartment passed through in the body (optional)
//! - `INVPARSE_ANALYZER_TIMEOUT_SECS`: Request timeout (default: 60)

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};

use super::types::{AnalyzeDocumentRequest, DocumentFeature, InlineDocument, RawAnalysisResult};
use super::{unavailable, DocumentAnalyzer};

/// Path of the analyze action, relative to the endpoint
const ANALYZE_PATH: &str = "/actions/analyzeDocument";

/// Remote analysis service client
#[derive(Clone)]
pub struct HttpAnalyzer {
    http_client: Client,
    base_url: String,
    token: Option<String>,
    compartment_id: Option<String>,
}

impl HttpAnalyzer {
    /// Create a new analyzer for the given endpoint
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            compartment_id: None,
        }
    }

    /// Create from a resolved configuration
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            Error::Config(
                "Analyzer endpoint not configured. Set INVPARSE_ANALYZER_ENDPOINT.".to_string(),
            )
        })?;

        let http_client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http_client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            compartment_id: config.compartment_id.clone(),
        })
    }

    /// Attach a bearer token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn build_request(&self, document: &[u8]) -> AnalyzeDocumentRequest {
        let encoded = base64::engine::general_purpose::STANDARD.encode(document);
        AnalyzeDocumentRequest {
            compartment_id: self.compartment_id.clone(),
            document: InlineDocument::new(encoded),
            features: DocumentFeature::invoice_features(),
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for HttpAnalyzer {
    async fn analyze(&self, document: &[u8]) -> Result<RawAnalysisResult> {
        let url = format!("{}{}", self.base_url, ANALYZE_PATH);
        let body = self.build_request(document);

        debug!(url = %url, bytes = document.len(), "Sending document for analysis");

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Analysis request failed");
            unavailable(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Analysis service returned error");
            return Err(unavailable(format!("status {}", status)));
        }

        let result: RawAnalysisResult = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to decode analysis result");
            unavailable(e)
        })?;

        debug!(
            pages = result.pages().len(),
            detected_types = result.detected_document_types().len(),
            "Analysis complete"
        );

        Ok(result)
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
