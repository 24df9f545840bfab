//! InvParse Core Library
//!
//! Shared functionality for the InvParse invoice extraction service:
//! - Pluggable document analysis backends (HTTP service, mock)
//! - Normalization of nested analysis results into flat invoice fields
//! - Confidence gate deciding whether an extraction is accepted
//! - Extraction pipeline tying analysis, gate and best-effort persistence together
//! - Database access and migrations for invoices, confidences and line items

pub mod analysis;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod gate;
pub mod models;
pub mod pipeline;

/// Test utilities including mock analysis server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analysis::{AnalyzerClient, DocumentAnalyzer, HttpAnalyzer, MockAnalyzer};
pub use config::AnalyzerConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use extract::{normalize, NormalizedExtraction};
pub use gate::{evaluate, GateResult, RejectReason, CONFIDENCE_THRESHOLD};
pub use pipeline::{ExtractionOutcome, InvoicePipeline};
