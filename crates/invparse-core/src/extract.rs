//! Normalization of raw analysis results
//!
//! Flattens the nested field tree returned by the analysis service into:
//! - `fields`: field name → extracted value, in encounter order
//! - `field_confidences`: field name → label confidence (or null)
//! - `items`: one record per line item
//!
//! plus the document-level confidence that the upload is an invoice.
//!
//! Normalization never fails. Missing collections are empty, unnamed fields
//! are skipped, and values pass through untouched.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::analysis::{
    DocumentField, FieldValue, RawAnalysisResult, INVOICE_DOCUMENT_TYPE, ITEMS_FIELD,
};

/// Ordered map of field name to value
pub type FieldMap = Map<String, Value>;

/// One line item: item field name → value
pub type ItemRecord = Map<String, Value>;

/// Confidence used when the classifier does not report an invoice type
pub const DEFAULT_DOCUMENT_CONFIDENCE: f64 = 1.0;

/// Flattened extraction result
///
/// Serializes to the API response shape `{confidence, data, dataConfidence}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedExtraction {
    /// Confidence that the document is an invoice
    pub confidence: f64,
    /// Field values. Always contains "Items" holding the line item list.
    #[serde(rename = "data")]
    pub fields: FieldMap,
    /// Per-field label confidence (number or null), keyed like `fields`
    #[serde(rename = "dataConfidence")]
    pub field_confidences: FieldMap,
    #[serde(skip)]
    pub items: Vec<ItemRecord>,
}

impl NormalizedExtraction {
    /// String value of a field, if present and a string
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Confidence recorded for a field
    pub fn field_confidence(&self, name: &str) -> Option<f64> {
        self.field_confidences.get(name).and_then(Value::as_f64)
    }
}

/// Normalize one raw analysis result
pub fn normalize(raw: &RawAnalysisResult) -> NormalizedExtraction {
    let confidence = document_confidence(raw);

    let mut fields = FieldMap::new();
    let mut field_confidences = FieldMap::new();
    let mut items = Vec::new();

    for page in raw.pages() {
        for field in page.document_fields() {
            match field.resolve() {
                FieldValue::ItemGroup(line_items) => {
                    items.extend(line_items.iter().map(item_record));
                }
                FieldValue::Scalar(value) => {
                    let Some(name) = field.name() else {
                        continue;
                    };
                    // Overwriting keeps the first insertion position
                    fields.insert(name.to_string(), value.clone());
                    field_confidences.insert(
                        name.to_string(),
                        field.label_confidence().map(Value::from).unwrap_or(Value::Null),
                    );
                }
            }
        }
    }

    // Always set, replacing any scalar field that was literally named "Items"
    fields.insert(
        ITEMS_FIELD.to_string(),
        Value::Array(items.iter().cloned().map(Value::Object).collect()),
    );

    NormalizedExtraction {
        confidence,
        fields,
        field_confidences,
        items,
    }
}

/// Confidence of the first "INVOICE" classification, in input order
fn document_confidence(raw: &RawAnalysisResult) -> f64 {
    raw.detected_document_types()
        .iter()
        .find(|t| t.document_type.as_deref() == Some(INVOICE_DOCUMENT_TYPE))
        .map(|t| t.confidence.unwrap_or(DEFAULT_DOCUMENT_CONFIDENCE))
        .unwrap_or(DEFAULT_DOCUMENT_CONFIDENCE)
}

/// Build one item record from a line item's named fields
fn item_record(line_item: &DocumentField) -> ItemRecord {
    let mut record = ItemRecord::new();
    for item_field in line_item.items() {
        if let Some(name) = item_field.name() {
            record.insert(name.to_string(), item_field.value().clone());
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{sample_invoice, DetectedDocumentType, Page};
    use serde_json::json;

    fn invoice_types(confidence: f64) -> Vec<DetectedDocumentType> {
        vec![DetectedDocumentType::new("INVOICE", confidence)]
    }

    #[test]
    fn test_empty_result_defaults() {
        let extraction = normalize(&RawAnalysisResult::default());

        assert_eq!(extraction.confidence, 1.0);
        assert_eq!(extraction.fields.len(), 1);
        assert_eq!(extraction.fields["Items"], json!([]));
        assert!(extraction.field_confidences.is_empty());
        assert!(extraction.items.is_empty());
    }

    #[test]
    fn test_absent_field_value_yields_null_entry() {
        let raw: RawAnalysisResult = serde_json::from_value(json!({
            "pages": [{ "documentFields": [
                { "fieldLabel": { "name": "InvoiceDate", "confidence": 0.5 } }
            ]}]
        }))
        .unwrap();

        let extraction = normalize(&raw);

        assert_eq!(extraction.fields["InvoiceDate"], Value::Null);
        assert_eq!(extraction.field_confidence("InvoiceDate"), Some(0.5));
    }

    #[test]
    fn test_unnamed_fields_are_skipped() {
        let raw: RawAnalysisResult = serde_json::from_value(json!({
            "pages": [{ "documentFields": [
                { "fieldValue": { "value": "orphan" } },
                { "fieldLabel": { "confidence": 0.7 }, "fieldValue": { "value": "orphan" } },
                { "fieldLabel": null, "fieldValue": null }
            ]}]
        }))
        .unwrap();

        let extraction = normalize(&raw);

        assert_eq!(extraction.fields.len(), 1);
        assert!(extraction.field_confidences.is_empty());
    }

    #[test]
    fn test_null_pages_and_classifications_are_skipped() {
        let raw: RawAnalysisResult = serde_json::from_value(json!({
            "detectedDocumentTypes": [null, { "documentType": "INVOICE", "confidence": 0.95 }],
            "pages": [
                null,
                { "documentFields": [
                    null,
                    { "fieldLabel": { "name": "InvoiceId", "confidence": 0.99 },
                      "fieldValue": { "value": "INV-9" } }
                ] }
            ]
        }))
        .unwrap();

        let extraction = normalize(&raw);

        assert_eq!(extraction.confidence, 0.95);
        assert_eq!(extraction.fields["InvoiceId"], json!("INV-9"));
        assert_eq!(extraction.fields.len(), 2);
    }

    #[test]
    fn test_missing_label_confidence_is_null() {
        let raw = RawAnalysisResult::new(
            vec![],
            vec![Page::new(vec![DocumentField::scalar("Memo", json!("n/a"), None)])],
        );

        let extraction = normalize(&raw);

        assert_eq!(extraction.field_confidences["Memo"], Value::Null);
    }

    #[test]
    fn test_first_invoice_type_wins() {
        let raw = RawAnalysisResult::new(
            vec![
                DetectedDocumentType::new("RECEIPT", 0.99),
                DetectedDocumentType::new("INVOICE", 0.42),
                DetectedDocumentType::new("INVOICE", 0.97),
            ],
            vec![],
        );

        assert_eq!(normalize(&raw).confidence, 0.42);
    }

    #[test]
    fn test_no_invoice_type_defaults_to_trusted() {
        let raw = RawAnalysisResult::new(
            vec![DetectedDocumentType::new("BANK_STATEMENT", 0.2)],
            vec![],
        );

        assert_eq!(normalize(&raw).confidence, 1.0);
    }

    #[test]
    fn test_last_write_wins_across_pages() {
        let raw = RawAnalysisResult::new(
            invoice_types(0.95),
            vec![
                Page::new(vec![
                    DocumentField::scalar("VendorName", json!("First"), Some(0.6)),
                    DocumentField::scalar("InvoiceId", json!("INV-9"), Some(0.9)),
                ]),
                Page::new(vec![DocumentField::scalar(
                    "VendorName",
                    json!("Second"),
                    Some(0.8),
                )]),
            ],
        );

        let extraction = normalize(&raw);

        assert_eq!(extraction.fields["VendorName"], json!("Second"));
        assert_eq!(extraction.field_confidence("VendorName"), Some(0.8));
        // Position stays where the name was first seen
        let keys: Vec<&str> = extraction.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["VendorName", "InvoiceId", "Items"]);
    }

    #[test]
    fn test_items_flattening() {
        let line = |n: i64| {
            DocumentField::line_item(vec![
                DocumentField::scalar("Description", json!(format!("Widget {}", n)), None),
                DocumentField::scalar("Quantity", json!(n), None),
                // Unnamed item field is dropped
                DocumentField {
                    field_label: None,
                    ..DocumentField::scalar("ignored", json!(1), None)
                },
            ])
        };
        let raw = RawAnalysisResult::new(
            invoice_types(0.95),
            vec![Page::new(vec![DocumentField::item_group(vec![
                line(1),
                line(2),
                line(3),
            ])])],
        );

        let extraction = normalize(&raw);

        assert_eq!(extraction.items.len(), 3);
        for (i, item) in extraction.items.iter().enumerate() {
            let keys: Vec<&str> = item.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["Description", "Quantity"]);
            assert_eq!(item["Quantity"], json!(i as i64 + 1));
        }
        assert_eq!(extraction.fields["Items"].as_array().unwrap().len(), 3);
        assert!(!extraction.field_confidences.contains_key("Items"));
    }

    #[test]
    fn test_empty_line_item_still_appended() {
        let raw = RawAnalysisResult::new(
            vec![],
            vec![Page::new(vec![DocumentField::item_group(vec![
                DocumentField::line_item(vec![]),
                DocumentField::default(),
            ])])],
        );

        let extraction = normalize(&raw);

        assert_eq!(extraction.fields["Items"], json!([{}, {}]));
    }

    #[test]
    fn test_items_accumulate_across_groups() {
        let group = |desc: &str| {
            DocumentField::item_group(vec![DocumentField::line_item(vec![
                DocumentField::scalar("Description", json!(desc), None),
            ])])
        };
        let raw = RawAnalysisResult::new(
            vec![],
            vec![Page::new(vec![group("a")]), Page::new(vec![group("b")])],
        );

        let extraction = normalize(&raw);

        assert_eq!(
            extraction.fields["Items"],
            json!([{ "Description": "a" }, { "Description": "b" }])
        );
    }

    #[test]
    fn test_items_group_without_items_is_empty() {
        let raw: RawAnalysisResult = serde_json::from_value(json!({
            "pages": [{ "documentFields": [
                { "fieldLabel": { "name": "Items" }, "fieldValue": { "value": "scalar?" } }
            ]}]
        }))
        .unwrap();

        let extraction = normalize(&raw);

        assert_eq!(extraction.fields["Items"], json!([]));
        assert!(extraction.field_confidences.is_empty());
    }

    #[test]
    fn test_values_pass_through_untyped() {
        let raw = RawAnalysisResult::new(
            vec![],
            vec![Page::new(vec![
                DocumentField::scalar("InvoiceId", json!(36259), None),
                DocumentField::scalar("SubTotal", json!("53.82"), None),
                DocumentField::scalar("PONumber", Value::Null, None),
            ])],
        );

        let extraction = normalize(&raw);

        assert_eq!(extraction.fields["InvoiceId"], json!(36259));
        assert_eq!(extraction.fields["SubTotal"], json!("53.82"));
        assert_eq!(extraction.fields["PONumber"], Value::Null);
    }

    #[test]
    fn test_sample_invoice_response_shape() {
        let extraction = normalize(&sample_invoice());
        let json = serde_json::to_value(&extraction).unwrap();

        assert_eq!(json["confidence"], json!(1.0));
        assert_eq!(json["data"]["InvoiceId"], json!("36259"));
        assert_eq!(json["data"]["Items"][0]["UnitPrice"], json!(17.94));
        assert_eq!(json["dataConfidence"]["SubTotal"], json!(0.90709054));
        assert!(json.get("items").is_none());
        assert_eq!(extraction.field_str("VendorName"), Some("SuperStore"));
    }
}
