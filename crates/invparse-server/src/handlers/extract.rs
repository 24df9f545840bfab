//! Document extraction handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::{AppError, AppState, INVALID_DOCUMENT_MESSAGE, MAX_UPLOAD_SIZE, UNAVAILABLE_MESSAGE};
use invparse_core::{Error, NormalizedExtraction};

/// POST /extract - Extract invoice fields from an uploaded PDF
///
/// Expects multipart form with:
/// - file: PDF document (required, max 10MB)
///
/// Responds with `{confidence, data, dataConfidence}` when the document is
/// accepted. Accepted invoices are stored; a storage failure does not fail
/// the request.
pub async fn extract_invoice(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<NormalizedExtraction>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        file_data = Some(bytes.to_vec());
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    if file_data.is_empty() {
        return Err(AppError::bad_request("No document data provided"));
    }

    let fingerprint = hex::encode(Sha256::digest(&file_data));
    info!(
        document = &fingerprint[..16],
        bytes = file_data.len(),
        "Extracting invoice"
    );

    match state.pipeline.extract(&file_data).await {
        Ok(outcome) => {
            info!(
                document = &fingerprint[..16],
                confidence = outcome.extraction.confidence,
                stored = outcome.saved_invoice_id.as_deref().unwrap_or("-"),
                "Invoice extracted"
            );
            Ok(Json(outcome.extraction))
        }
        Err(Error::RemoteUnavailable(reason)) => {
            warn!(document = &fingerprint[..16], reason = %reason, "Document analysis failed");
            Err(AppError::service_unavailable(UNAVAILABLE_MESSAGE))
        }
        Err(Error::LowConfidence(confidence)) => {
            info!(document = &fingerprint[..16], confidence, "Document rejected");
            Err(AppError::bad_request(INVALID_DOCUMENT_MESSAGE))
        }
        Err(e) => Err(e.into()),
    }
}
