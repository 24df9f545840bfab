//! Extraction pipeline
//!
//! analyze → normalize → confidence gate → best-effort save
//!
//! A remote failure stops the pipeline before anything is normalized or
//! written. A rejected document is never written. A failed write is logged
//! and swallowed: the caller still gets the accepted extraction.

use tracing::{debug, info, warn};

use crate::analysis::{AnalyzerClient, DocumentAnalyzer};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::extract::{normalize, NormalizedExtraction};
use crate::gate::{evaluate, GateResult};

/// Result of an accepted extraction
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub extraction: NormalizedExtraction,
    /// Invoice ID written to storage, if the save happened and succeeded
    pub saved_invoice_id: Option<String>,
}

/// Runs uploaded documents through analysis, gating and storage
#[derive(Clone)]
pub struct InvoicePipeline {
    analyzer: AnalyzerClient,
    db: Option<Database>,
}

impl InvoicePipeline {
    /// Pipeline that saves accepted extractions to `db`
    pub fn new(analyzer: AnalyzerClient, db: Database) -> Self {
        Self {
            analyzer,
            db: Some(db),
        }
    }

    /// Pipeline that never writes (dry run)
    pub fn without_storage(analyzer: AnalyzerClient) -> Self {
        Self { analyzer, db: None }
    }

    /// Extract an invoice from a PDF document.
    ///
    /// Errors with `Error::RemoteUnavailable` when analysis fails and with
    /// `Error::LowConfidence` when the document is rejected by the gate.
    pub async fn extract(&self, document: &[u8]) -> Result<ExtractionOutcome> {
        debug!(
            bytes = document.len(),
            analyzer = %self.analyzer.host(),
            "Analyzing document"
        );

        let raw = self.analyzer.analyze(document).await.map_err(|e| match e {
            Error::RemoteUnavailable(_) => e,
            other => Error::RemoteUnavailable(other.to_string()),
        })?;

        let extraction = normalize(&raw);

        match evaluate(&extraction) {
            GateResult::Accepted => {}
            GateResult::Rejected { reason } => {
                info!(
                    confidence = extraction.confidence,
                    reason = reason.as_str(),
                    "Document rejected"
                );
                return Err(Error::LowConfidence(extraction.confidence));
            }
        }

        let saved_invoice_id = self.save(&extraction);

        Ok(ExtractionOutcome {
            extraction,
            saved_invoice_id,
        })
    }

    /// Best-effort save. Failures are logged, never returned.
    fn save(&self, extraction: &NormalizedExtraction) -> Option<String> {
        let db = self.db.as_ref()?;

        match db.save_extraction(&extraction.fields, &extraction.field_confidences) {
            Ok(Some(invoice_id)) => {
                info!(
                    invoice_id = %invoice_id,
                    items = extraction.items.len(),
                    "Invoice stored"
                );
                Some(invoice_id)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    error = %e,
                    invoice_id = extraction.field_str("InvoiceId").unwrap_or("-"),
                    "Failed to store invoice, returning extraction anyway"
                );
                None
            }
        }
    }
}
