//! Stored invoice handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::{AppError, AppState, SuccessResponse};
use invparse_core::models::{Invoice, VendorInvoices};

/// GET /invoice/:id - Get a stored invoice with its items
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    Path(invoice_id): Path<String>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state
        .db
        .get_invoice(&invoice_id)?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;

    Ok(Json(invoice))
}

/// GET /invoices/vendor/:vendor - Get all invoices for a vendor
///
/// An unknown vendor yields an empty list, not an error.
pub async fn get_vendor_invoices(
    State(state): State<Arc<AppState>>,
    Path(vendor_name): Path<String>,
) -> Result<Json<VendorInvoices>, AppError> {
    let invoices = state.db.get_invoices_by_vendor(&vendor_name)?;

    Ok(Json(VendorInvoices::new(&vendor_name, invoices)))
}

/// DELETE /invoice/:id - Delete an invoice with its confidences and items
pub async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    Path(invoice_id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_invoice(&invoice_id)? {
        return Err(AppError::not_found("Invoice not found"));
    }

    info!(invoice_id = %invoice_id, "Invoice deleted");
    Ok(Json(SuccessResponse { success: true }))
}
