//! Mock analyzer for testing
//!
//! Returns a canned analysis result (or a canned failure) for every document.
//! Useful for unit tests and local development without the remote service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::error::Result;

use super::types::{DetectedDocumentType, DocumentField, Page, RawAnalysisResult};
use super::{unavailable, DocumentAnalyzer};

/// Mock analyzer
#[derive(Clone, Default)]
pub struct MockAnalyzer {
    /// Result to return; `None` makes every call fail
    result: Option<RawAnalysisResult>,
    calls: Arc<AtomicUsize>,
}

impl MockAnalyzer {
    /// Mock returning the given result
    pub fn returning(result: RawAnalysisResult) -> Self {
        Self {
            result: Some(result),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mock that fails every call
    pub fn failing() -> Self {
        Self {
            result: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mock returning a complete sample invoice
    pub fn invoice() -> Self {
        Self::returning(sample_invoice())
    }

    /// Number of analyze calls made so far (shared across clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentAnalyzer for MockAnalyzer {
    async fn analyze(&self, _document: &[u8]) -> Result<RawAnalysisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .ok_or_else(|| unavailable("mock analyzer configured to fail"))
    }

    fn host(&self) -> &str {
        "mock"
    }
}

/// Sample analysis of a one-line SuperStore invoice
pub fn sample_invoice() -> RawAnalysisResult {
    let line_item = DocumentField::line_item(vec![
        DocumentField::scalar(
            "Description",
            json!("Newell 330 Art, Office Supplies, OFF-AR-5309"),
            None,
        ),
        DocumentField::scalar(
            "Name",
            json!("Newell 330 Art, Office Supplies, OFF-AR-5309"),
            None,
        ),
        DocumentField::scalar("Quantity", json!(3), None),
        DocumentField::scalar("UnitPrice", json!(17.94), None),
        DocumentField::scalar("Amount", json!(53.82), None),
    ]);

    let fields = vec![
        DocumentField::scalar("VendorName", json!("SuperStore"), Some(0.9491271)),
        DocumentField::scalar("InvoiceId", json!("36259"), Some(0.9995704)),
        DocumentField::scalar(
            "InvoiceDate",
            json!("2012-03-06T00:00:00+00:00"),
            Some(0.9999474),
        ),
        DocumentField::scalar(
            "ShippingAddress",
            json!("98103, Seattle, Washington, United States"),
            Some(0.9818857),
        ),
        DocumentField::scalar(
            "BillingAddressRecipient",
            json!("Aaron Bergman"),
            Some(0.9970944),
        ),
        DocumentField::scalar("SubTotal", json!(53.82), Some(0.90709054)),
        DocumentField::scalar("ShippingCost", json!(4.29), Some(0.98618066)),
        DocumentField::scalar("InvoiceTotal", json!(58.11), Some(0.9974165)),
        DocumentField::item_group(vec![line_item]),
    ];

    RawAnalysisResult::new(
        vec![DetectedDocumentType::new("INVOICE", 1.0)],
        vec![Page::new(fields)],
    )
}
