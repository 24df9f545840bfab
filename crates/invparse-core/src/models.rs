//! Domain models for InvParse
//!
//! Stored invoices serialize with the same PascalCase field names the
//! extractor emits, so a fetched invoice looks like the extraction that
//! produced it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::ITEMS_FIELD;
use crate::extract::FieldMap;

/// A stored invoice with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Invoice {
    pub invoice_id: String,
    pub vendor_name: Option<String>,
    pub invoice_date: Option<String>,
    pub billing_address_recipient: Option<String>,
    pub shipping_address: Option<String>,
    pub sub_total: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub invoice_total: Option<f64>,
    pub items: Vec<InvoiceItem>,
}

/// One stored line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceItem {
    pub description: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub amount: Option<f64>,
}

/// Stored per-field confidences for an invoice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceConfidence {
    pub vendor_name: Option<f64>,
    pub invoice_date: Option<f64>,
    pub billing_address_recipient: Option<f64>,
    pub shipping_address: Option<f64>,
    pub sub_total: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub invoice_total: Option<f64>,
}

/// Invoices found for a vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorInvoices {
    #[serde(rename = "VendorName")]
    pub vendor_name: String,
    #[serde(rename = "TotalInvoices")]
    pub total_count: usize,
    pub invoices: Vec<Invoice>,
}

impl VendorInvoices {
    pub fn new(vendor_name: &str, invoices: Vec<Invoice>) -> Self {
        Self {
            vendor_name: vendor_name.to_string(),
            total_count: invoices.len(),
            invoices,
        }
    }
}

/// Invoice row set to write, built from an accepted extraction
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub invoice_id: String,
    pub vendor_name: Option<String>,
    pub invoice_date: Option<String>,
    pub billing_address_recipient: Option<String>,
    pub shipping_address: Option<String>,
    pub sub_total: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub invoice_total: Option<f64>,
    pub confidence: InvoiceConfidence,
    pub items: Vec<InvoiceItem>,
}

impl NewInvoice {
    /// Map extracted fields and confidences onto storage columns.
    ///
    /// Returns `None` when there is no usable `InvoiceId`: nothing is
    /// written for such an extraction.
    pub fn from_fields(fields: &FieldMap, confidences: &FieldMap) -> Option<Self> {
        let invoice_id = fields
            .get("InvoiceId")
            .and_then(text_column)
            .filter(|id| !id.is_empty())?;

        let text = |name: &str| fields.get(name).and_then(text_column);
        let real = |name: &str| fields.get(name).and_then(real_column);
        let conf = |name: &str| confidences.get(name).and_then(real_column);

        let items = fields
            .get(ITEMS_FIELD)
            .and_then(Value::as_array)
            .map(|items| items.iter().map(InvoiceItem::from_value).collect())
            .unwrap_or_default();

        Some(Self {
            invoice_id,
            vendor_name: text("VendorName"),
            invoice_date: text("InvoiceDate"),
            billing_address_recipient: text("BillingAddressRecipient"),
            shipping_address: text("ShippingAddress"),
            sub_total: real("SubTotal"),
            shipping_cost: real("ShippingCost"),
            invoice_total: real("InvoiceTotal"),
            confidence: InvoiceConfidence {
                vendor_name: conf("VendorName"),
                invoice_date: conf("InvoiceDate"),
                billing_address_recipient: conf("BillingAddressRecipient"),
                shipping_address: conf("ShippingAddress"),
                sub_total: conf("SubTotal"),
                shipping_cost: conf("ShippingCost"),
                invoice_total: conf("InvoiceTotal"),
            },
            items,
        })
    }
}

impl InvoiceItem {
    /// Map one extracted item record onto storage columns
    pub fn from_value(value: &Value) -> Self {
        let text = |name: &str| value.get(name).and_then(text_column);
        let real = |name: &str| value.get(name).and_then(real_column);

        Self {
            description: text("Description"),
            name: text("Name"),
            quantity: real("Quantity"),
            unit_price: real("UnitPrice"),
            amount: real("Amount"),
        }
    }
}

/// Coerce an extracted value for a TEXT column
pub fn text_column(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerce an extracted value for a REAL column
pub fn real_column(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
