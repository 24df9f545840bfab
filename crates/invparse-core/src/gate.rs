//! Confidence gate
//!
//! Decides whether a normalized extraction is trustworthy enough to return
//! and persist, based on the document-level invoice confidence.

use crate::extract::NormalizedExtraction;

/// Minimum document confidence for acceptance (inclusive)
pub const CONFIDENCE_THRESHOLD: f64 = 0.9;

/// Why an extraction was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    LowConfidence,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowConfidence => "low-confidence",
        }
    }
}

/// Gate decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateResult {
    Accepted,
    Rejected { reason: RejectReason },
}

impl GateResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateResult::Accepted)
    }
}

/// Apply the acceptance threshold to an extraction
pub fn evaluate(extraction: &NormalizedExtraction) -> GateResult {
    evaluate_confidence(extraction.confidence)
}

/// Apply the acceptance threshold to a raw confidence value.
///
/// NaN never satisfies the comparison and is rejected.
pub fn evaluate_confidence(confidence: f64) -> GateResult {
    if confidence >= CONFIDENCE_THRESHOLD {
        GateResult::Accepted
    } else {
        GateResult::Rejected {
            reason: RejectReason::LowConfidence,
        }
    }
}
